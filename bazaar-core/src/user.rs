// User repo/service layer
use crate::{
    db,
    error::MarketError,
    models::*,
    utils,
};
use log::{
    debug,
    error,
    info,
};

fn email_key(email: &str) -> String {
    format!("{}-{}", crate::USER_EMAIL_DB_KEY, utils::normalize(email))
}

/// Create a new user. Emails are unique after normalization.
pub fn create(email: &str, name: &str, password_hash: String, salt: String) -> Result<User, MarketError> {
    let email = utils::normalize(email);
    let _guard = db::lock_records()?;
    if db::get::<String>(&email_key(&email))?.is_some() {
        error!("email already registered");
        return Err(MarketError::Conflict(String::from("email already registered")));
    }
    let new_user = User {
        uid: utils::generate_id(crate::USER_DB_KEY),
        email: String::from(&email),
        name: String::from(name.trim()),
        role: Role::Customer,
        password_hash,
        salt,
        suspended: false,
        created: utils::now(),
    };
    debug!("insert user: {}", &new_user.uid);
    db::put(&new_user.uid, &new_user)?;
    db::put(&email_key(&email), &new_user.uid)?;
    db::index_push(crate::USER_LIST_DB_KEY, &new_user.uid)?;
    Ok(new_user)
}

/// User lookup
pub fn find(uid: &str) -> Result<User, MarketError> {
    if !utils::is_id(uid, crate::USER_DB_KEY) {
        return Err(MarketError::NotFound);
    }
    match db::get::<User>(uid)? {
        Some(u) => Ok(u),
        None => {
            error!("user not found");
            Err(MarketError::NotFound)
        }
    }
}

/// User lookup by login email
pub fn find_by_email(email: &str) -> Result<Option<User>, MarketError> {
    match db::get::<String>(&email_key(email))? {
        Some(uid) => Ok(db::get::<User>(&uid)?),
        None => Ok(None),
    }
}

/// All users with credentials stripped
pub fn find_all() -> Result<Vec<User>, MarketError> {
    let mut users: Vec<User> = Vec::new();
    for uid in db::index_read(crate::USER_LIST_DB_KEY)? {
        if let Some(u) = db::get::<User>(&uid)? {
            users.push(u.redacted());
        }
    }
    Ok(users)
}

/// Promote or demote a user
pub fn set_role(uid: &str, role: Role) -> Result<User, MarketError> {
    info!("setting role {:?} for {}", role, uid);
    let mut u = find(uid)?;
    u.role = role;
    db::put(&u.uid, &u)?;
    Ok(u)
}

/// Suspended users can't authenticate
pub fn set_suspended(uid: &str, suspended: bool) -> Result<User, MarketError> {
    info!("setting suspended={} for {}", suspended, uid);
    let mut u = find(uid)?;
    if u.role == Role::Admin && suspended {
        return Err(MarketError::Forbidden);
    }
    u.suspended = suspended;
    db::put(&u.uid, &u)?;
    Ok(u.redacted())
}

/// Removes a user and its email lookup, only used to clean up tests and seeds
pub fn delete(uid: &str) -> Result<(), MarketError> {
    let u = find(uid)?;
    db::remove(&email_key(&u.email))?;
    db::remove(uid)?;
    db::index_remove(crate::USER_LIST_DB_KEY, uid)
}

// Tests
//-------------------------------------------------------------------------------
