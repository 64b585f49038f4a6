//! Logic for interfacing with LMDB.

extern crate kn0sys_lmdb_rs as lmdb;

use crate::{
    error::MarketError,
    utils,
};
use lazy_static::lazy_static;
use lmdb::*;
use log::{
    debug,
    error,
    info,
};
use serde::{
    de::DeserializeOwned,
    Serialize,
};
use std::sync::{
    Mutex,
    MutexGuard,
};
use sysinfo::System;

/// Ratio of map size to available memory is 20 percent
const MAP_SIZE_MEMORY_RATIO: f32 = 0.2;
/// Ratio of chunk size to available memory is 0.2 percent
const CHUNK_SIZE_MEMORY_RATIO: f32 = MAP_SIZE_MEMORY_RATIO * 0.01;
/// Floor for the map size when available memory can't be read
const MIN_MAP_SIZE: u64 = 1024 * 1024 * 1024;
/// Floor for the chunk size when available memory can't be read
const MIN_CHUNK_SIZE: usize = 64 * 1024;

lazy_static! {
    /// Process wide environment shared by every repository module
    pub static ref DATABASE_LOCK: DatabaseEnvironment = {
        let env = utils::get_release_env().db_env_name();
        DatabaseEnvironment::open(&env)
            .unwrap_or_else(|e| panic!("could not open LMDB environment {}: {:?}", env, e))
    };
    static ref CHUNK_SIZE: usize = {
        let mut s = System::new();
        s.refresh_memory();
        let size = (s.available_memory() as f32 * CHUNK_SIZE_MEMORY_RATIO) as usize;
        size.max(MIN_CHUNK_SIZE)
    };
    static ref INDEX_LOCK: Mutex<()> = Mutex::new(());
    static ref RECORD_LOCK: Mutex<()> = Mutex::new(());
}

/// The database environment for handling primary database operations.
///
/// By default the database will be written to ~/.bazaar/{ENV}
pub struct DatabaseEnvironment {
    /// LMDB environment
    pub env: Environment,
    /// Handle for the default database
    pub handle: DbHandle,
}

impl DatabaseEnvironment {
    /// Opens environment in the data directory. The map size defaults to 20 percent
    ///
    /// of available memory and can be set via the `LMDB_MAP_SIZE` environment variable.
    pub fn open(env: &str) -> Result<Self, MdbError> {
        let mut s = System::new();
        s.refresh_memory();
        let default_map_size: u64 = ((s.available_memory() as f32 * MAP_SIZE_MEMORY_RATIO)
            .floor() as u64)
            .max(MIN_MAP_SIZE);
        let env_map_size: u64 = match std::env::var("LMDB_MAP_SIZE") {
            Err(_) => default_map_size,
            Ok(size) => size.parse::<u64>().unwrap_or(default_map_size),
        };
        info!("setting lmdb map size to: {}", env_map_size);
        let file_path = format!("{}/{}", utils::get_data_dir(), env);
        info!("excecuting lmdb open at {}", file_path);
        if let Err(e) = std::fs::create_dir_all(&file_path) {
            error!("could not create {}: {:?}", file_path, e);
            return Err(MdbError::Panic);
        }
        let env: Environment = EnvBuilder::new()
            .map_size(env_map_size)
            .open(&file_path, 0o777)?;
        let handle: DbHandle = env.get_default_db(DbFlags::empty())?;
        Ok(DatabaseEnvironment { env, handle })
    }
    /// Read key from the database. If it doesn't exist then
    ///
    /// an empty vector will be returned. Treat all empty vectors
    ///
    /// from database operations as missing records.
    pub fn read(e: &Environment, h: &DbHandle, k: &Vec<u8>) -> Result<Vec<u8>, MdbError> {
        // don't try and read empty keys
        if k.is_empty() {
            error!("can't read empty key");
            return Err(MdbError::NotFound);
        }
        let reader: ReadonlyTransaction = e.get_reader()?;
        let db: Database = reader.bind(h);
        let mut result: Vec<u8> = Vec::new();
        for num_writes in 0..usize::MAX {
            let mut r = db
                .get::<Vec<u8>>(&chunk_key(k, num_writes))
                .unwrap_or_default();
            if r.is_empty() {
                break;
            }
            result.append(&mut r);
        }
        if result.is_empty() {
            debug!("key {:?} not found", String::from_utf8_lossy(k));
        }
        Ok(result)
    }
    /// Deletes every chunk stored for a key
    pub fn delete(e: &Environment, h: &DbHandle, k: &[u8]) -> Result<(), MdbError> {
        if k.is_empty() {
            error!("can't delete empty key");
            return Err(MdbError::NotFound);
        }
        let txn = e.new_transaction()?;
        {
            let db = txn.bind(h);
            clear_chunks(&db, k)?;
        }
        txn.commit()
    }
}

/// Chunk keys are the key with the big endian chunk number appended
fn chunk_key(k: &[u8], n: usize) -> Vec<u8> {
    let mut new_key: Vec<u8> = k.to_vec();
    new_key.extend_from_slice(&n.to_be_bytes());
    new_key
}

fn clear_chunks(db: &Database, k: &[u8]) -> Result<(), MdbError> {
    for num_writes in 0..usize::MAX {
        let key = chunk_key(k, num_writes);
        let r = db.get::<Vec<u8>>(&key).unwrap_or_default();
        if r.is_empty() {
            break;
        }
        db.del(&key)?;
    }
    Ok(())
}

/// Write chunks to the database. The chunk size is 0.2 percent
///
/// of available memory. Stale chunks from a previous, longer
///
/// value are cleared in the same transaction.
pub fn write_chunks(e: &Environment, h: &DbHandle, k: &[u8], v: &[u8]) -> Result<(), MdbError> {
    if k.is_empty() {
        error!("can't write empty key");
        return Err(MdbError::NotFound);
    }
    let txn = e.new_transaction()?;
    {
        let db: Database = txn.bind(h);
        clear_chunks(&db, k)?;
        for (n, chunk) in v.chunks(*CHUNK_SIZE).enumerate() {
            db.set(&chunk_key(k, n), &chunk.to_vec())?;
        }
    }
    txn.commit()
}

/// Serialize and store a record
pub fn put<T: Serialize>(k: &str, v: &T) -> Result<(), MarketError> {
    let db = &DATABASE_LOCK;
    let bytes = bincode::serialize(v)?;
    write_chunks(&db.env, &db.handle, k.as_bytes(), &bytes)?;
    Ok(())
}

/// Lookup and deserialize a record, `None` when the key is absent
pub fn get<T: DeserializeOwned>(k: &str) -> Result<Option<T>, MarketError> {
    let db = &DATABASE_LOCK;
    let r = DatabaseEnvironment::read(&db.env, &db.handle, &k.as_bytes().to_vec())?;
    if r.is_empty() {
        return Ok(None);
    }
    Ok(Some(bincode::deserialize(&r[..])?))
}

/// Delete a record
pub fn remove(k: &str) -> Result<(), MarketError> {
    let db = &DATABASE_LOCK;
    DatabaseEnvironment::delete(&db.env, &db.handle, k.as_bytes())?;
    Ok(())
}

/// Ids stored under an index key
pub fn index_read(list_key: &str) -> Result<Vec<String>, MarketError> {
    Ok(get::<Vec<String>>(list_key)?.unwrap_or_default())
}

/// Append an id to an index, ignoring duplicates
pub fn index_push(list_key: &str, id: &str) -> Result<(), MarketError> {
    let _guard = INDEX_LOCK.lock().map_err(|_| MarketError::Unknown)?;
    let mut ids = index_read(list_key)?;
    if ids.iter().any(|i| i == id) {
        return Ok(());
    }
    ids.push(String::from(id));
    debug!("writing index {} with {} ids", list_key, ids.len());
    put(list_key, &ids)
}

/// Drop an id from an index
pub fn index_remove(list_key: &str, id: &str) -> Result<(), MarketError> {
    let _guard = INDEX_LOCK.lock().map_err(|_| MarketError::Unknown)?;
    let mut ids = index_read(list_key)?;
    ids.retain(|i| i != id);
    put(list_key, &ids)
}

/// Serialises read-modify-write sequences on records such as stock
///
/// levels and coupon usage. Always taken before the index lock.
pub fn lock_records() -> Result<MutexGuard<'static, ()>, MarketError> {
    RECORD_LOCK.lock().map_err(|_| MarketError::Unknown)
}

// Tests
//-------------------------------------------------------------------------------
#[cfg(test)]
mod tests {

    use super::*;

    use rand::RngCore;

    #[test]
    fn chunked_value_test() -> Result<(), MdbError> {
        let db = &DATABASE_LOCK;
        let mut data = vec![0u8; *CHUNK_SIZE * 2 + 17];
        rand::thread_rng().fill_bytes(&mut data);
        let k = format!("test-chunks-{}", utils::generate_rnd());
        write_chunks(&db.env, &db.handle, k.as_bytes(), &data)?;
        let actual = DatabaseEnvironment::read(&db.env, &db.handle, &k.as_bytes().to_vec())?;
        assert_eq!(data, actual);
        // a shorter value must not pick up the stale tail chunks
        write_chunks(&db.env, &db.handle, k.as_bytes(), b"short")?;
        let actual = DatabaseEnvironment::read(&db.env, &db.handle, &k.as_bytes().to_vec())?;
        assert_eq!(b"short".to_vec(), actual);
        DatabaseEnvironment::delete(&db.env, &db.handle, k.as_bytes())?;
        let actual = DatabaseEnvironment::read(&db.env, &db.handle, &k.as_bytes().to_vec())?;
        assert!(actual.is_empty());
        Ok(())
    }

    #[test]
    fn empty_key_test() {
        let db = &DATABASE_LOCK;
        assert!(write_chunks(&db.env, &db.handle, b"", b"value").is_err());
        assert!(DatabaseEnvironment::read(&db.env, &db.handle, &Vec::new()).is_err());
    }

    #[test]
    fn typed_record_test() -> Result<(), MarketError> {
        let k = format!("test-record-{}", utils::generate_rnd());
        assert_eq!(get::<String>(&k)?, None);
        put(&k, &String::from("value"))?;
        assert_eq!(get::<String>(&k)?, Some(String::from("value")));
        remove(&k)?;
        assert_eq!(get::<String>(&k)?, None);
        Ok(())
    }

    #[test]
    fn index_test() -> Result<(), MarketError> {
        let k = format!("test-index-{}", utils::generate_rnd());
        index_push(&k, "a")?;
        index_push(&k, "b")?;
        index_push(&k, "a")?;
        assert_eq!(index_read(&k)?, vec![String::from("a"), String::from("b")]);
        index_remove(&k, "a")?;
        assert_eq!(index_read(&k)?, vec![String::from("b")]);
        remove(&k)?;
        assert!(index_read(&k)?.is_empty());
        Ok(())
    }
}
