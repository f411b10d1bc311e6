//! Conversions between session types and the text stored in SQLite.
//!
//! The principal is stored as compact JSON using its wire field names; the
//! token is stored verbatim.

use mdd_core::principal::Principal;

use crate::Result;

pub fn encode_principal(p: &Principal) -> Result<String> { Ok(serde_json::to_string(p)?) }

pub fn decode_principal(s: &str) -> Result<Principal> { Ok(serde_json::from_str(s)?) }
