//! Card payments through an external provider. The provider reports
//! the outcome with a signed webhook.

use crate::{
    db,
    error::MarketError,
    models::*,
    order,
    reqres,
    utils,
};
use hmac::{
    Hmac,
    Mac,
};
use log::{
    debug,
    error,
    info,
};
use rocket::{
    http::Status,
    outcome::Outcome,
    request,
    request::FromRequest,
    Request,
};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Pointer from an order to its latest payment reference
fn order_payment_key(orid: &str) -> String {
    format!("{}-{}", crate::PAYMENT_DB_KEY, orid)
}

fn webhook_mac() -> Result<HmacSha256, MarketError> {
    HmacSha256::new_from_slice(utils::get_webhook_secret().as_bytes())
        .map_err(|_| MarketError::Unknown)
}

/// Hex HMAC-SHA256 of a webhook body under the configured secret
pub fn sign(body: &str) -> Result<String, MarketError> {
    let mut mac = webhook_mac()?;
    mac.update(body.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant time check of the provider signature
pub fn verify_signature(body: &str, signature: &str) -> Result<(), MarketError> {
    let expected = hex::decode(signature.trim()).map_err(|_| {
        error!("webhook signature is not hex");
        MarketError::Unauthorized
    })?;
    let mut mac = webhook_mac()?;
    mac.update(body.as_bytes());
    mac.verify_slice(&expected).map_err(|_| {
        error!("webhook signature mismatch");
        MarketError::Unauthorized
    })
}

/// Raw `X-Bazaar-Signature` header of a webhook call
pub struct WebhookSignature(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for WebhookSignature {
    type Error = MarketError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match request.headers().get_one(crate::WEBHOOK_SIGNATURE_HEADER) {
            Some(sig) => Outcome::Success(WebhookSignature(String::from(sig))),
            None => {
                error!("webhook without signature");
                Outcome::Error((Status::Unauthorized, MarketError::Unauthorized))
            }
        }
    }
}

/// Payment lookup by provider reference
pub fn find(reference: &str) -> Result<Payment, MarketError> {
    if !utils::is_id(reference, crate::PAYMENT_DB_KEY) {
        return Err(MarketError::NotFound);
    }
    db::get::<Payment>(reference)?.ok_or(MarketError::NotFound)
}

/// Latest payment attempt for an order
pub fn find_by_order(orid: &str) -> Result<Option<Payment>, MarketError> {
    match db::get::<String>(&order_payment_key(orid))? {
        Some(reference) => db::get::<Payment>(&reference),
        None => Ok(None),
    }
}

/// Start a card payment for a pending order. An attempt still waiting
///
/// on the provider is handed out again instead of opening a second one.
pub fn initiate(uid: &str, orid: &str) -> Result<reqres::PaymentResponse, MarketError> {
    let _guard = db::lock_records()?;
    let o = order::find_for_customer(uid, orid)?;
    if o.payment_method != PaymentMethod::Card {
        return Err(MarketError::Payment(String::from(
            "cash on delivery orders are paid to the courier",
        )));
    }
    if o.status != OrderStatus::Pending {
        return Err(MarketError::Payment(format!(
            "order is {:?}, not awaiting payment",
            o.status
        )));
    }
    if let Some(p) = find_by_order(orid)? {
        if p.state == PaymentState::Initiated && p.amount == o.total {
            debug!("reusing payment {}", &p.reference);
            return Ok(reqres::PaymentResponse {
                reference: p.reference,
                orid: p.orid,
                amount: p.amount,
            });
        }
    }
    let p = Payment {
        reference: utils::generate_id(crate::PAYMENT_DB_KEY),
        orid: String::from(orid),
        uid: String::from(uid),
        amount: o.total,
        state: PaymentState::Initiated,
        created: utils::now(),
        settled: 0,
    };
    info!("initiating payment {} for order {}", &p.reference, orid);
    db::put(&p.reference, &p)?;
    db::put(&order_payment_key(orid), &p.reference)?;
    Ok(reqres::PaymentResponse {
        reference: p.reference,
        orid: p.orid,
        amount: p.amount,
    })
}

/// Provider callback. Nothing in the body is trusted until the
///
/// signature checks out.
pub fn webhook(body: &str, signature: &str) -> Result<reqres::WebhookAck, MarketError> {
    verify_signature(body, signature)?;
    let event: reqres::WebhookEvent = serde_json::from_str(body).map_err(|e| {
        error!("malformed webhook: {:?}", e);
        MarketError::InvalidInput(String::from("malformed webhook body"))
    })?;
    let _guard = db::lock_records()?;
    let mut p = find(&event.reference)?;
    if p.state != PaymentState::Initiated {
        info!("replayed webhook for settled payment {}", &p.reference);
        return Ok(reqres::WebhookAck {
            reference: p.reference,
            state: p.state,
        });
    }
    if event.amount != p.amount {
        error!(
            "payment {} amount mismatch: expected {} got {}",
            &p.reference, p.amount, event.amount
        );
        return Err(MarketError::Payment(String::from("amount mismatch")));
    }
    match event.status.as_str() {
        "succeeded" => {
            order::mark_paid(&p.orid)?;
            p.state = PaymentState::Succeeded;
        }
        "failed" => p.state = PaymentState::Failed,
        other => {
            return Err(MarketError::InvalidInput(format!(
                "unknown payment status {}",
                other
            )))
        }
    }
    p.settled = utils::now();
    info!("payment {} {:?}", &p.reference, p.state);
    db::put(&p.reference, &p)?;
    Ok(reqres::WebhookAck {
        reference: p.reference,
        state: p.state,
    })
}

/// Removes a payment record, only used to clean up tests
pub fn delete(reference: &str) -> Result<(), MarketError> {
    let p = find(reference)?;
    db::remove(&order_payment_key(&p.orid))?;
    db::remove(reference)
}

// Tests
//-------------------------------------------------------------------------------
