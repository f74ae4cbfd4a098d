//! Value encoding. Everything except counters is bincode.

use serde::de::DeserializeOwned;
use serde::Serialize;

use iq_store::StoreError;
use iq_types::ValAddress;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

pub(crate) fn decode_str(key: &[u8]) -> Result<String, StoreError> {
    std::str::from_utf8(key)
        .map(str::to_string)
        .map_err(|e| StoreError::Corruption(format!("non-utf8 key: {e}")))
}

pub(crate) fn decode_validator(key: &[u8]) -> Result<ValAddress, StoreError> {
    let raw = decode_str(key)?;
    ValAddress::new(raw).map_err(|e| StoreError::Corruption(e.to_string()))
}

pub(crate) fn decode_u64(bytes: &[u8]) -> Result<u64, StoreError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StoreError::Corruption(format!("expected 8 bytes, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(arr))
}
