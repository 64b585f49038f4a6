// Product repo/service layer
use crate::{
    db,
    error::MarketError,
    models::*,
    reqres,
    trending,
    utils,
    vendor,
};
use log::{
    debug,
    error,
    info,
};
use std::collections::{
    BTreeSet,
    HashMap,
};

fn vendor_list_key(vid: &str) -> String {
    format!("{}-{}", crate::VENDOR_PRODUCT_LIST_DB_KEY, vid)
}

/// check product field lengths to prevent db spam
fn validate_product(p: &reqres::ProductRequest) -> Result<(), MarketError> {
    info!("validating product: {}", &p.name);
    utils::validate_text("name", &p.name, utils::string_limit())?;
    utils::validate_text("category", &p.category, utils::string_limit())?;
    if p.description.len() > utils::description_limit() {
        return Err(MarketError::InvalidInput(String::from("description is too long")));
    }
    if p.price == 0 {
        return Err(MarketError::InvalidInput(String::from("price must be positive")));
    }
    if p.images.len() > utils::image_limit()
        || p.images.iter().any(|i| i.len() > utils::string_limit())
    {
        return Err(MarketError::InvalidInput(String::from("too many images")));
    }
    Ok(())
}

/// Create a new product for a store
pub fn create(vid: &str, p: &reqres::ProductRequest) -> Result<Product, MarketError> {
    validate_product(p)?;
    let new_product = Product {
        pid: utils::generate_id(crate::PRODUCT_DB_KEY),
        vid: String::from(vid),
        name: String::from(p.name.trim()),
        description: String::from(&p.description),
        category: utils::normalize(&p.category),
        price: p.price,
        stock: p.stock,
        images: p.images.to_vec(),
        active: true,
        views: 0,
        sales: 0,
        created: utils::now(),
    };
    debug!("insert product: {:?}", &new_product);
    db::put(&new_product.pid, &new_product)?;
    db::index_push(crate::PRODUCT_LIST_DB_KEY, &new_product.pid)?;
    db::index_push(&vendor_list_key(vid), &new_product.pid)?;
    Ok(new_product)
}

/// Single Product lookup
pub fn find(pid: &str) -> Result<Product, MarketError> {
    if !utils::is_id(pid, crate::PRODUCT_DB_KEY) {
        return Err(MarketError::NotFound);
    }
    match db::get::<Product>(pid)? {
        Some(p) => Ok(p),
        None => {
            error!("product not found");
            Err(MarketError::NotFound)
        }
    }
}

/// Product lookup for all
pub fn find_all() -> Result<Vec<Product>, MarketError> {
    collect(db::index_read(crate::PRODUCT_LIST_DB_KEY)?)
}

/// Every product of a store, including inactive ones
pub fn find_by_vendor(vid: &str) -> Result<Vec<Product>, MarketError> {
    collect(db::index_read(&vendor_list_key(vid))?)
}

fn collect(ids: Vec<String>) -> Result<Vec<Product>, MarketError> {
    let mut products: Vec<Product> = Vec::new();
    for pid in ids {
        if let Some(p) = db::get::<Product>(&pid)? {
            products.push(p);
        }
    }
    Ok(products)
}

/// Persist a product, callers own validation and locking
pub(crate) fn save(p: &Product) -> Result<(), MarketError> {
    db::put(&p.pid, p)
}

/// Modify product, only the owning store may do so
pub fn modify(vid: &str, p: &reqres::ProductRequest) -> Result<Product, MarketError> {
    info!("modify product: {}", &p.pid);
    validate_product(p)?;
    let _guard = db::lock_records()?;
    let f_prod = find(&p.pid)?;
    if f_prod.vid != vid {
        error!("store {} does not own product {}", vid, &p.pid);
        return Err(MarketError::Forbidden);
    }
    let up = Product {
        name: String::from(p.name.trim()),
        description: String::from(&p.description),
        category: utils::normalize(&p.category),
        price: p.price,
        stock: p.stock,
        images: p.images.to_vec(),
        active: p.active,
        ..Default::default()
    };
    let u_prod = Product::update(f_prod, &up);
    save(&u_prod)?;
    Ok(u_prod)
}

/// Soft delete, orders keep pointing at the record
pub fn remove(vid: &str, pid: &str) -> Result<Product, MarketError> {
    info!("remove product: {}", pid);
    let _guard = db::lock_records()?;
    let mut f_prod = find(pid)?;
    if f_prod.vid != vid {
        return Err(MarketError::Forbidden);
    }
    f_prod.active = false;
    save(&f_prod)?;
    Ok(f_prod)
}

/// Count a storefront visit
pub fn record_view(pid: &str) -> Result<Product, MarketError> {
    let _guard = db::lock_records()?;
    let mut p = find(pid)?;
    p.views += 1;
    save(&p)?;
    Ok(p)
}

/// Products customers can see: active, in stock, approved store
fn listed() -> Result<Vec<Product>, MarketError> {
    let mut approved: HashMap<String, bool> = HashMap::new();
    let mut products: Vec<Product> = Vec::new();
    for p in find_all()? {
        if !p.active || p.stock == 0 {
            continue;
        }
        let ok = match approved.get(&p.vid) {
            Some(ok) => *ok,
            None => {
                let ok = vendor::is_approved(&p.vid)?;
                approved.insert(String::from(&p.vid), ok);
                ok
            }
        };
        if ok {
            products.push(p);
        }
    }
    Ok(products)
}

/// Whether a customer can buy this product right now
pub fn is_listed(p: &Product) -> Result<bool, MarketError> {
    Ok(p.active && p.stock > 0 && vendor::is_approved(&p.vid)?)
}

/// Case-insensitive substring search over name, description and
///
/// category with optional filters. Newest first.
pub fn search(q: &reqres::ProductQuery) -> Result<reqres::ProductPage, MarketError> {
    let needle = q.q.as_deref().map(utils::normalize).unwrap_or_default();
    let category = q.category.as_deref().map(utils::normalize);
    let mut matches: Vec<Product> = listed()?
        .into_iter()
        .filter(|p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
                || p.category.contains(&needle)
        })
        .filter(|p| match &category {
            Some(c) if !c.is_empty() => &p.category == c,
            _ => true,
        })
        .filter(|p| q.min_price.map_or(true, |min| p.price >= min))
        .filter(|p| q.max_price.map_or(true, |max| p.price <= max))
        .collect();
    matches.sort_by(|a, b| b.created.cmp(&a.created));
    let per_page = q.per_page.unwrap_or(20).clamp(1, crate::MAX_PAGE_SIZE);
    let page = q.page.unwrap_or(1).max(1);
    let total = matches.len();
    let products: Vec<Product> = matches
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();
    Ok(reqres::ProductPage {
        products,
        page,
        per_page,
        total,
    })
}

/// Distinct categories of listed products
pub fn categories() -> Result<Vec<String>, MarketError> {
    let set: BTreeSet<String> = listed()?.into_iter().map(|p| p.category).collect();
    Ok(set.into_iter().collect())
}

/// Listed products by descending trending score
pub fn trending(limit: usize) -> Result<Vec<reqres::TrendingProduct>, MarketError> {
    let now = utils::now();
    let mut scored: Vec<reqres::TrendingProduct> = listed()?
        .into_iter()
        .map(|p| {
            let score = trending::score(p.sales, p.views, trending::age_hours(p.created, now));
            reqres::TrendingProduct { product: p, score }
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit.min(crate::MAX_PAGE_SIZE));
    Ok(scored)
}

/// Storefront page of an approved store
pub fn store_page(vid: &str) -> Result<reqres::StorePage, MarketError> {
    let v = vendor::find(vid)?;
    if v.status != StoreStatus::Approved {
        return Err(MarketError::NotFound);
    }
    let mut products: Vec<Product> = find_by_vendor(vid)?
        .into_iter()
        .filter(|p| p.active && p.stock > 0)
        .collect();
    products.sort_by(|a, b| b.created.cmp(&a.created));
    Ok(reqres::StorePage {
        vid: v.vid,
        name: v.name,
        description: v.description,
        products,
    })
}

/// Removes a product record, only used to clean up tests and seeds
pub fn delete(pid: &str) -> Result<(), MarketError> {
    let p = find(pid)?;
    db::remove(pid)?;
    db::index_remove(crate::PRODUCT_LIST_DB_KEY, pid)?;
    db::index_remove(&vendor_list_key(&p.vid), pid)
}

// Tests
//-------------------------------------------------------------------------------
