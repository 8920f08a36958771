//! Kakao login and the guest signup steps

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::models::Registration;
use crate::services::{ConfirmRequest, GatePass, LoginResolution, PaidRegistration, ProfileInput};
use crate::state::{AppContext, PaymentOrder, SignupSession};
use super::{ok, ApiResult};

#[derive(Debug, Deserialize)]
pub struct KakaoLoginRequest {
    pub code: String,
}

/// Login outcome plus a member pass when the guest is already a user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub resolution: LoginResolution,
    pub member_pass: Option<GatePass>,
}

/// Finish Kakao login and decide where the guest goes next
pub async fn kakao_login(
    State(ctx): State<AppContext>,
    Json(request): Json<KakaoLoginRequest>,
) -> ApiResult<LoginResponse> {
    let identity = ctx.services.kakao.login(&request.code).await?;
    let resolution = ctx.services.signup.resolve_login(&identity).await?;
    let member_pass = resolution
        .user_id()
        .map(|user_id| ctx.services.access.issue_member(user_id, Utc::now()))
        .transpose()?;

    ok(LoginResponse { resolution, member_pass })
}

pub async fn get_session(
    State(ctx): State<AppContext>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<SignupSession> {
    ok(ctx.services.signup.session(session_id).await?)
}

pub async fn save_profile(
    State(ctx): State<AppContext>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<ProfileInput>,
) -> ApiResult<SignupSession> {
    ok(ctx.services.signup.save_profile(session_id, input).await?)
}

/// Account the guest transfers the fee to
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransferResponse {
    pub registration: Registration,
    pub bank_account: BankAccount,
    pub member_pass: GatePass,
}

pub async fn bank_transfer(
    State(ctx): State<AppContext>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<BankTransferResponse> {
    let registration = ctx.services.signup.register_bank_transfer(session_id).await?;
    let member_pass = ctx.services.access.issue_member(registration.user_id(), Utc::now())?;
    let account = &ctx.settings.registration.bank_account;

    ok(BankTransferResponse {
        registration,
        bank_account: BankAccount {
            bank_name: account.bank_name.clone(),
            account_number: account.account_number.clone(),
            account_holder: account.account_holder.clone(),
        },
        member_pass,
    })
}

/// Order plus the client key the payment widget is initialised with
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrderResponse {
    #[serde(flatten)]
    pub order: PaymentOrder,
    pub client_key: String,
    pub test_mode: bool,
}

pub async fn payment_order(
    State(ctx): State<AppContext>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<PaymentOrderResponse> {
    let order = ctx.services.signup.create_payment_order(session_id).await?;
    ok(PaymentOrderResponse {
        order,
        client_key: ctx.settings.toss.client_key.clone(),
        test_mode: ctx.services.payment.is_test_mode(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmResponse {
    #[serde(flatten)]
    pub paid: PaidRegistration,
    pub member_pass: GatePass,
}

pub async fn payment_confirm(
    State(ctx): State<AppContext>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ConfirmRequest>,
) -> ApiResult<PaymentConfirmResponse> {
    let paid = ctx.services.signup.confirm_payment(session_id, request).await?;
    let member_pass = ctx.services.access.issue_member(paid.registration.user_id(), Utc::now())?;
    ok(PaymentConfirmResponse { paid, member_pass })
}
