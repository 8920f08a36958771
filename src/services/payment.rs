//! Toss Payments confirmation client

use std::time::Duration;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use crate::config::TossConfig;
use crate::utils::errors::{PartyGateError, Result};
use crate::utils::logging::log_payment_event;

/// Confirmation request sent to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub payment_key: String,
    pub order_id: String,
    pub amount: i64,
}

impl ConfirmRequest {
    /// Reject missing parameters and non-positive amounts
    pub fn validate(&self) -> Result<()> {
        if self.payment_key.trim().is_empty() || self.order_id.trim().is_empty() {
            return Err(PartyGateError::InvalidInput("필수 파라미터가 누락되었습니다.".to_string()));
        }
        if self.amount <= 0 {
            return Err(PartyGateError::InvalidInput("유효하지 않은 결제 금액입니다.".to_string()));
        }
        Ok(())
    }
}

/// Confirmed payment as reported by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedPayment {
    pub payment_key: String,
    pub order_id: String,
    pub status: String,
    pub total_amount: i64,
    pub method: Option<String>,
    pub requested_at: Option<String>,
    pub approved_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TossErrorResponse {
    code: Option<String>,
    message: Option<String>,
}

/// Check a client-reported amount against the expected amount
pub fn verify_payment_amount(amount: i64, expected: i64) -> Result<()> {
    if amount == expected && amount > 0 {
        Ok(())
    } else {
        Err(PartyGateError::InvalidAmount { expected, actual: amount })
    }
}

/// User-facing Korean message for a gateway error code
pub fn payment_error_message(code: &str) -> &'static str {
    match code {
        "PAY_PROCESS_CANCELED" => "결제가 취소되었습니다.",
        "PAY_PROCESS_ABORTED" => "결제 진행 중 문제가 발생했습니다.",
        "REJECT_CARD_COMPANY" => "카드사에서 결제를 거절했습니다.",
        "EXCEED_MAX_DAILY_PAYMENT_COUNT" => "일일 결제 한도를 초과했습니다.",
        "EXCEED_MAX_PAYMENT_AMOUNT" => "결제 금액 한도를 초과했습니다.",
        "INVALID_CARD_EXPIRATION" => "카드 유효기간이 만료되었습니다.",
        "INVALID_STOPPED_CARD" => "정지된 카드입니다.",
        "INVALID_CARD_LOST_OR_STOLEN" => "분실 또는 도난 신고된 카드입니다.",
        "NOT_SUPPORTED_INSTALLMENT_PLAN_CARD_OR_MERCHANT" => "할부가 지원되지 않는 카드입니다.",
        "INVALID_CARD_NUMBER" => "카드 번호가 올바르지 않습니다.",
        "BELOW_MINIMUM_AMOUNT" => "최소 결제 금액 이하입니다.",
        "ALREADY_PROCESSED_PAYMENT" => "이미 처리된 결제입니다.",
        "NOT_FOUND_PAYMENT" => "결제 정보를 찾을 수 없습니다.",
        "NOT_FOUND_PAYMENT_SESSION" => "결제 세션이 만료되었습니다.",
        "USER_CANCEL" => "사용자가 결제를 취소했습니다.",
        "INVALID_REQUEST" => "잘못된 요청입니다.",
        "FORBIDDEN_REQUEST" => "허용되지 않은 요청입니다.",
        _ => "결제 처리 중 오류가 발생했습니다.",
    }
}

/// Display name of a payment method
pub fn payment_method_text(method: &str) -> &str {
    match method {
        "카드" | "CARD" => "신용/체크카드",
        "간편결제" | "EASY_PAY" => "간편결제",
        "계좌이체" | "TRANSFER" => "계좌이체",
        "가상계좌" | "VIRTUAL_ACCOUNT" => "가상계좌",
        "휴대폰" | "MOBILE_PHONE" => "휴대폰 결제",
        other => other,
    }
}

#[derive(Clone)]
#[derive(Debug)]
pub struct PaymentService {
    client: Client,
    config: TossConfig,
}

impl PaymentService {
    pub fn new(config: TossConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("PartyGate/1.0")
            .build()?;

        Ok(Self { client, config })
    }

    /// Whether the configured keys are Toss test keys
    pub fn is_test_mode(&self) -> bool {
        self.config.client_key.starts_with("test_")
    }

    /// Ask the gateway to confirm an authorized payment
    ///
    /// Gateway errors are passed through as `Payment { code, message }`.
    pub async fn confirm(&self, request: &ConfirmRequest) -> Result<ConfirmedPayment> {
        request.validate()?;

        let url = format!("{}/v1/payments/confirm", self.config.api_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.secret_key, Some(""))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: TossErrorResponse = response.json().await.unwrap_or_default();
            let code = body.code.unwrap_or_else(|| "PAYMENT_CONFIRM_FAILED".to_string());
            let message = body.message.unwrap_or_else(|| "결제 승인에 실패했습니다.".to_string());
            error!(order_id = %request.order_id, status = %status, code = %code, "Toss payment confirmation failed");
            log_payment_event(&request.order_id, request.amount, "failed", Some(&code));
            return Err(PartyGateError::Payment { code, message });
        }

        let payment: ConfirmedPayment = response.json().await?;
        info!(
            order_id = %payment.order_id,
            status = %payment.status,
            amount = payment.total_amount,
            method = payment.method.as_deref().unwrap_or("unknown"),
            "Payment confirmed successfully"
        );
        log_payment_event(&payment.order_id, payment.total_amount, &payment.status, None);
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_payment_amount() {
        assert!(verify_payment_amount(30000, 30000).is_ok());
        assert!(matches!(
            verify_payment_amount(100, 30000),
            Err(PartyGateError::InvalidAmount { expected: 30000, actual: 100 })
        ));
        assert!(verify_payment_amount(0, 0).is_err());
    }

    #[test]
    fn test_confirm_request_validation() {
        let ok = ConfirmRequest { payment_key: "pk".into(), order_id: "order_1".into(), amount: 1000 };
        assert!(ok.validate().is_ok());

        let missing = ConfirmRequest { payment_key: "".into(), ..ok.clone() };
        assert!(matches!(missing.validate(), Err(PartyGateError::InvalidInput(_))));

        let negative = ConfirmRequest { amount: -5, ..ok };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(payment_error_message("REJECT_CARD_COMPANY"), "카드사에서 결제를 거절했습니다.");
        assert_eq!(payment_error_message("SOMETHING_NEW"), "결제 처리 중 오류가 발생했습니다.");
        assert_eq!(payment_method_text("EASY_PAY"), "간편결제");
        assert_eq!(payment_method_text("포인트"), "포인트");
    }

    #[test]
    fn test_confirm_request_wire_format() {
        let request = ConfirmRequest { payment_key: "pk".into(), order_id: "order_1".into(), amount: 1000 };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"paymentKey": "pk", "orderId": "order_1", "amount": 1000}));
    }
}
