use rocket::{
    get,
    http::{
        Cookie,
        CookieJar,
        SameSite,
        Status,
    },
    post,
    response::status::Custom,
    serde::json::Json,
};

use bazaar_core::{
    error::MarketError,
    *,
};

/// Create a customer account
#[post("/register", data = "<req>")]
pub async fn register(
    req: Json<reqres::RegisterRequest>,
) -> Result<Custom<Json<models::User>>, MarketError> {
    Ok(Custom(Status::Created, Json(auth::register(&req)?)))
}

/// Issue a session token, also set as an http-only cookie
#[post("/login", data = "<req>")]
pub async fn login(
    req: Json<reqres::LoginRequest>,
    cookies: &CookieJar<'_>,
) -> Result<Custom<Json<reqres::SessionResponse>>, MarketError> {
    let session = auth::login(&req)?;
    cookies.add(
        Cookie::build((SESSION_COOKIE, String::from(&session.token)))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/"),
    );
    Ok(Custom(Status::Ok, Json(session)))
}

#[post("/logout")]
pub async fn logout(cookies: &CookieJar<'_>) -> Status {
    cookies.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Status::NoContent
}

/// Account behind the current session
#[get("/me")]
pub async fn me(session: auth::Session) -> Result<Custom<Json<models::User>>, MarketError> {
    Ok(Custom(Status::Ok, Json(user::find(&session.uid)?.redacted())))
}
