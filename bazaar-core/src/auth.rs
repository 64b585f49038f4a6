//! Session authorization module that uses JWTs carried in a cookie

use crate::{
    error::MarketError,
    models::*,
    reqres,
    user,
    utils,
    vendor,
};
use log::{
    debug,
    error,
    info,
};
use rocket::{
    http::Status,
    outcome::{
        try_outcome,
        Outcome,
    },
    request,
    request::FromRequest,
    Request,
};

use hmac::{
    Hmac,
    Mac,
};
use jwt::*;
use sha2::Sha384;
use std::collections::BTreeMap;

/// Salt hashed against when a login names no account
const UNKNOWN_ACCOUNT_SALT: &str = "bazaar-unknown-account";

/// Register a new customer account
pub fn register(r: &reqres::RegisterRequest) -> Result<User, MarketError> {
    info!("registering user");
    let email = utils::normalize(&r.email);
    validate_email(&email)?;
    utils::validate_text("name", &r.name, utils::string_limit())?;
    if r.password.len() < crate::MIN_PASSWORD_LENGTH || r.password.len() > utils::string_limit() {
        return Err(MarketError::InvalidInput(format!(
            "password must be at least {} characters",
            crate::MIN_PASSWORD_LENGTH
        )));
    }
    let salt = utils::generate_rnd();
    let password_hash = hash_password(&r.password, &salt)?;
    let u = user::create(&email, &r.name, password_hash, salt)?;
    Ok(u.redacted())
}

/// Check credentials and issue a signed session token
pub fn login(r: &reqres::LoginRequest) -> Result<reqres::SessionResponse, MarketError> {
    let found = user::find_by_email(&r.email)?;
    // unknown emails pay for a hash too so response times match
    let salt = found.as_ref().map_or(UNKNOWN_ACCOUNT_SALT, |u| u.salt.as_str());
    let candidate = hash_password(&r.password, salt)?;
    let f_user = match found {
        Some(u) => u,
        None => {
            debug!("login for unknown email");
            return Err(MarketError::Unauthorized);
        }
    };
    if !hashes_match(&candidate, &f_user.password_hash)? {
        error!("password verification failed");
        return Err(MarketError::Unauthorized);
    }
    if f_user.suspended {
        return Err(MarketError::Forbidden);
    }
    let expiration = utils::now() + utils::get_token_timeout();
    let token = create_token(&f_user.uid, f_user.role, expiration)?;
    info!("session issued for {}", f_user.uid);
    Ok(reqres::SessionResponse {
        uid: f_user.uid,
        role: f_user.role,
        token,
        expiration,
    })
}

fn validate_email(email: &str) -> Result<(), MarketError> {
    let valid = email.len() < utils::string_limit()
        && match email.split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.'),
            None => false,
        };
    if !valid {
        return Err(MarketError::InvalidInput(String::from("invalid email")));
    }
    Ok(())
}

/// Salted, iterated HMAC-SHA384 hex digest
pub fn hash_password(password: &str, salt: &str) -> Result<String, MarketError> {
    let mut digest: Vec<u8> = password.as_bytes().to_vec();
    for _ in 0..crate::PASSWORD_HASH_ROUNDS {
        let mut mac: Hmac<Sha384> =
            Hmac::new_from_slice(salt.as_bytes()).map_err(|_| MarketError::Unknown)?;
        mac.update(&digest);
        mac.update(password.as_bytes());
        digest = mac.finalize().into_bytes().to_vec();
    }
    Ok(hex::encode(digest))
}

/// Compare password hashes in constant time
fn hashes_match(candidate: &str, stored: &str) -> Result<bool, MarketError> {
    let key = utils::generate_rnd();
    let keyed = |h: &str| -> Result<Hmac<Sha384>, MarketError> {
        let mut mac: Hmac<Sha384> =
            Hmac::new_from_slice(key.as_bytes()).map_err(|_| MarketError::Unknown)?;
        mac.update(h.as_bytes());
        Ok(mac)
    };
    let expected = keyed(stored)?.finalize().into_bytes();
    Ok(keyed(candidate)?.verify_slice(&expected).is_ok())
}

fn role_value(role: Role) -> String {
    match role {
        Role::Customer => String::from("customer"),
        Role::Vendor => String::from("vendor"),
        Role::Admin => String::from("admin"),
    }
}

fn signing_key() -> Result<Hmac<Sha384>, MarketError> {
    let jwt_secret_key = utils::get_jwt_secret_key()?;
    Hmac::new_from_slice(jwt_secret_key.as_bytes()).map_err(|_| MarketError::Unknown)
}

fn create_token(uid: &str, role: Role, expiration: i64) -> Result<String, MarketError> {
    let key = signing_key()?;
    let header = Header {
        algorithm: AlgorithmType::Hs384,
        ..Default::default()
    };
    let mut claims = BTreeMap::new();
    claims.insert("uid", String::from(uid));
    claims.insert("role", role_value(role));
    claims.insert("expiration", expiration.to_string());
    let token = Token::new(header, claims)
        .sign_with_key(&key)
        .map_err(|e| {
            error!("failed to sign token: {:?}", e);
            MarketError::Unknown
        })?;
    Ok(String::from(token.as_str()))
}

/// Verify signature and expiration, returning the uid the token was issued to
pub fn verify_token(token: &str) -> Result<String, SessionError> {
    let key = signing_key().map_err(|_| SessionError::Invalid)?;
    let jwt: Result<
        Token<jwt::Header, BTreeMap<std::string::String, std::string::String>, _>,
        jwt::Error,
    > = token.verify_with_key(&key);
    let j = jwt.map_err(|_| SessionError::Invalid)?;
    let claims = j.claims();
    let uid = claims.get("uid").ok_or(SessionError::Invalid)?;
    let expire = claims
        .get("expiration")
        .and_then(|e| e.parse::<i64>().ok())
        .unwrap_or(0);
    if utils::now() > expire {
        return Err(SessionError::Expired);
    }
    debug!("claim uid: {}", uid);
    Ok(String::from(uid))
}

/// Authenticated user for the request. The user record is re-read
///
/// so role changes and suspensions apply to live tokens.
#[derive(Debug)]
pub struct Session {
    pub uid: String,
    pub role: Role,
}

#[derive(Debug)]
pub enum SessionError {
    Expired,
    Missing,
    Invalid,
    Suspended,
    Forbidden,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Session {
    type Error = SessionError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let token: Option<String> = match request.cookies().get(crate::SESSION_COOKIE) {
            Some(c) => Some(String::from(c.value())),
            None => request.headers().get_one(crate::SESSION_HEADER).map(String::from),
        };
        let token = match token {
            Some(t) => t,
            None => return Outcome::Error((Status::Unauthorized, SessionError::Missing)),
        };
        let uid = match verify_token(&token) {
            Ok(uid) => uid,
            Err(e) => return Outcome::Error((Status::Unauthorized, e)),
        };
        match user::find(&uid) {
            Ok(u) if u.suspended => Outcome::Error((Status::Forbidden, SessionError::Suspended)),
            Ok(u) => Outcome::Success(Session {
                uid: u.uid,
                role: u.role,
            }),
            Err(_) => Outcome::Error((Status::Unauthorized, SessionError::Invalid)),
        }
    }
}

/// Session of a user owning an approved store
#[derive(Debug)]
pub struct VendorSession {
    pub session: Session,
    pub vendor: Vendor,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for VendorSession {
    type Error = SessionError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let session = try_outcome!(request.guard::<Session>().await);
        if session.role != Role::Vendor {
            return Outcome::Error((Status::Forbidden, SessionError::Forbidden));
        }
        match vendor::find_by_user(&session.uid) {
            Ok(Some(v)) if v.status == StoreStatus::Approved => {
                Outcome::Success(VendorSession { session, vendor: v })
            }
            _ => Outcome::Error((Status::Forbidden, SessionError::Forbidden)),
        }
    }
}

/// Session of a platform operator
#[derive(Debug)]
pub struct AdminSession(pub Session);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminSession {
    type Error = SessionError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let session = try_outcome!(request.guard::<Session>().await);
        if session.role != Role::Admin {
            return Outcome::Error((Status::Forbidden, SessionError::Forbidden));
        }
        Outcome::Success(AdminSession(session))
    }
}

// Tests
//-------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn register_test_user(password: &str) -> Result<(User, String), MarketError> {
        let email = format!("{}@test.bazaar", &utils::generate_rnd()[..12]);
        let u = register(&reqres::RegisterRequest {
            email: String::from(&email),
            password: String::from(password),
            name: String::from("Auth Test"),
        })?;
        Ok((u, email))
    }

    #[test]
    fn hash_password_test() -> Result<(), MarketError> {
        let a = hash_password("correct horse", "salt-a")?;
        assert_eq!(a, hash_password("correct horse", "salt-a")?);
        assert_ne!(a, hash_password("correct horse", "salt-b")?);
        assert_ne!(a, hash_password("wrong horse", "salt-a")?);
        Ok(())
    }

    #[test]
    fn register_and_login_test() -> Result<(), MarketError> {
        let (u, email) = register_test_user("hunter2hunter2")?;
        assert!(u.password_hash.is_empty());
        let s = login(&reqres::LoginRequest {
            email: email.to_uppercase(),
            password: String::from("hunter2hunter2"),
        })?;
        assert_eq!(s.uid, u.uid);
        assert_eq!(s.role, Role::Customer);
        assert!(s.expiration > utils::now());
        let uid = verify_token(&s.token).map_err(|_| MarketError::Unauthorized)?;
        assert_eq!(uid, u.uid);
        user::delete(&u.uid)?;
        Ok(())
    }

    #[test]
    fn wrong_password_test() -> Result<(), MarketError> {
        let (u, email) = register_test_user("hunter2hunter2")?;
        let r = login(&reqres::LoginRequest {
            email,
            password: String::from("hunter3hunter3"),
        });
        assert!(matches!(r, Err(MarketError::Unauthorized)));
        let r = login(&reqres::LoginRequest {
            email: String::from("nobody@test.bazaar"),
            password: String::from("hunter2hunter2"),
        });
        assert!(matches!(r, Err(MarketError::Unauthorized)));
        user::delete(&u.uid)?;
        Ok(())
    }

    #[test]
    fn hashes_match_test() -> Result<(), MarketError> {
        let a = hash_password("correct horse", "salt-a")?;
        assert!(hashes_match(&a, &a)?);
        assert!(!hashes_match(&a, &hash_password("wrong horse", "salt-a")?)?);
        assert!(!hashes_match(&a, &a[..a.len() - 1])?);
        assert!(!hashes_match(&a, "")?);
        Ok(())
    }

    #[test]
    fn suspended_login_test() -> Result<(), MarketError> {
        let (u, email) = register_test_user("hunter2hunter2")?;
        user::set_suspended(&u.uid, true)?;
        let r = login(&reqres::LoginRequest {
            email,
            password: String::from("hunter2hunter2"),
        });
        assert!(matches!(r, Err(MarketError::Forbidden)));
        user::delete(&u.uid)?;
        Ok(())
    }

    #[test]
    fn invalid_registration_test() {
        let short = register(&reqres::RegisterRequest {
            email: String::from("short@test.bazaar"),
            password: String::from("short"),
            name: String::from("a"),
        });
        assert!(matches!(short, Err(MarketError::InvalidInput(_))));
        let bad_email = register(&reqres::RegisterRequest {
            email: String::from("not-an-email"),
            password: String::from("long enough"),
            name: String::from("a"),
        });
        assert!(matches!(bad_email, Err(MarketError::InvalidInput(_))));
    }

    #[test]
    fn token_test() -> Result<(), MarketError> {
        let token = create_token("u123", Role::Vendor, utils::now() + 60)?;
        assert_eq!(verify_token(&token).ok(), Some(String::from("u123")));
        let expired = create_token("u123", Role::Vendor, utils::now() - 60)?;
        assert!(matches!(verify_token(&expired), Err(SessionError::Expired)));
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(matches!(verify_token(&tampered), Err(SessionError::Invalid)));
        Ok(())
    }
}
