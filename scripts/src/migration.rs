//! Replay of stored posts from a previous post storage contract into a new one

use alloy::{
    dyn_abi::DynSolValue,
    json_abi::JsonAbi,
    primitives::{Address, TxHash},
};
use deploy_common::types::{PostRecord, StoredPost};
use indexmap::IndexMap;
use tracing::{info, warn};

use crate::{client::ArtifactContract, errors::ScriptError};

/// The post storage method returning the posts of a user
pub const GET_POSTS_METHOD: &str = "getPosts";
/// The post storage method ingesting a batch of posts
pub const MIGRATE_METHOD: &str = "migrate";
/// The auth storage method listing every known user
pub const GET_USER_ADDRESSES_METHOD: &str = "getUserAddresses";
/// The name of the URI field of a stored post
const URI_FIELD: &str = "uri";

/// Posts grouped by the user they belong to, in user order
pub type PostsByUser = IndexMap<Address, Vec<PostRecord>>;

// ----------
// | Traits |
// ----------

/// A store from which the posts of a user can be read
#[allow(async_fn_in_trait)]
pub trait PostSource {
    /// The posts of the given user
    async fn posts(&self, user: Address) -> Result<Vec<StoredPost>, ScriptError>;
}

/// A store that ingests batches of posts
#[allow(async_fn_in_trait)]
pub trait PostSink: PostSource {
    /// Ingest a batch of posts, returning once the ingestion is confirmed
    async fn migrate(&self, batch: &[PostRecord]) -> Result<TxHash, ScriptError>;
}

// ----------
// | Replay |
// ----------

/// Replay the posts of every user from `source` into `sink`.
///
/// All posts are read before the first write. Each user's posts are then
/// submitted as one batch, every record attributed to that user, and each
/// batch is confirmed before the next one is sent. Once every batch is in,
/// the sink is re-read and its posts returned for inspection; differences
/// are logged but do not fail the replay.
pub async fn replay<S: PostSource, K: PostSink>(
    users: &[Address],
    source: &S,
    sink: &K,
) -> Result<PostsByUser, ScriptError> {
    let mut batches = PostsByUser::new();
    for &user in users {
        let posts = source.posts(user).await?;
        batches.insert(user, attribute_to(user, posts));
    }

    for (user, batch) in &batches {
        info!("Migrating {} posts of {user}", batch.len());
        let tx_hash = sink.migrate(batch).await?;
        info!("Migrated posts of {user} in {tx_hash:#x}");
    }

    let mut migrated = PostsByUser::new();
    for (&user, batch) in &batches {
        let posts = attribute_to(user, sink.posts(user).await?);
        if posts.len() != batch.len() {
            warn!(
                "{user} has {} posts after migration, {} were submitted",
                posts.len(),
                batch.len()
            );
        }

        migrated.insert(user, posts);
    }

    Ok(migrated)
}

/// Attribute stored posts to the given user
fn attribute_to(user: Address, posts: Vec<StoredPost>) -> Vec<PostRecord> {
    posts
        .into_iter()
        .map(|post| PostRecord {
            recipient: user,
            uri: post.uri,
        })
        .collect()
}

// -----------
// | On-chain |
// -----------

/// A post storage contract bound through its address & ABI artifact
pub struct PostStorage {
    /// The bound contract
    contract: ArtifactContract,
    /// The position of the URI field within a returned post, if posts are
    /// returned as structs
    uri_index: Option<usize>,
}

impl PostStorage {
    /// Wrap a bound post storage contract
    pub fn new(contract: ArtifactContract) -> Self {
        let uri_index = uri_field_index(contract.abi());
        Self { contract, uri_index }
    }

    /// The address of the contract
    pub fn address(&self) -> Address {
        self.contract.address()
    }
}

impl PostSource for PostStorage {
    async fn posts(&self, user: Address) -> Result<Vec<StoredPost>, ScriptError> {
        let output = self.contract.call(GET_POSTS_METHOD, &[DynSolValue::Address(user)]).await?;
        decode_posts(output.first(), self.uri_index)
    }
}

impl PostSink for PostStorage {
    async fn migrate(&self, batch: &[PostRecord]) -> Result<TxHash, ScriptError> {
        let receipt = self.contract.send(MIGRATE_METHOD, &[encode_batch(batch)]).await?;
        Ok(receipt.transaction_hash)
    }
}

/// List every user known to an auth storage contract
pub async fn user_addresses(auth_storage: &ArtifactContract) -> Result<Vec<Address>, ScriptError> {
    let output = auth_storage.call(GET_USER_ADDRESSES_METHOD, &[]).await?;
    decode_addresses(output.first())
}

/// Encode a batch of posts as the `(address recipient, string uri)[]`
/// argument of the ingestion method
pub fn encode_batch(batch: &[PostRecord]) -> DynSolValue {
    DynSolValue::Array(
        batch
            .iter()
            .map(|post| {
                DynSolValue::Tuple(vec![
                    DynSolValue::Address(post.recipient),
                    DynSolValue::String(post.uri.clone()),
                ])
            })
            .collect(),
    )
}

/// The position of the URI field in the struct returned by `getPosts`
fn uri_field_index(abi: &JsonAbi) -> Option<usize> {
    let function = abi.function(GET_POSTS_METHOD)?.first()?;
    let output = function.outputs.first()?;
    output.components.iter().position(|component| component.name == URI_FIELD)
}

/// Decode the output of `getPosts`, either an array of post structs or an
/// array of URIs
pub fn decode_posts(
    output: Option<&DynSolValue>,
    uri_index: Option<usize>,
) -> Result<Vec<StoredPost>, ScriptError> {
    let posts = output.and_then(DynSolValue::as_array).ok_or_else(|| {
        ScriptError::ContractInteraction(format!("{GET_POSTS_METHOD} did not return an array"))
    })?;

    posts
        .iter()
        .map(|post| {
            let uri = match post {
                DynSolValue::String(uri) => Some(uri.clone()),
                DynSolValue::Tuple(fields) => match uri_index {
                    Some(i) => fields.get(i).and_then(DynSolValue::as_str).map(str::to_string),
                    None => fields.iter().find_map(DynSolValue::as_str).map(str::to_string),
                },
                _ => None,
            };

            uri.map(|uri| StoredPost { uri }).ok_or_else(|| {
                ScriptError::ContractInteraction(format!("malformed post: {post:?}"))
            })
        })
        .collect()
}

/// Decode an array of addresses
fn decode_addresses(output: Option<&DynSolValue>) -> Result<Vec<Address>, ScriptError> {
    let values = output.and_then(DynSolValue::as_array).ok_or_else(|| {
        ScriptError::ContractInteraction(format!(
            "{GET_USER_ADDRESSES_METHOD} did not return an array"
        ))
    })?;

    values
        .iter()
        .map(|value| {
            value.as_address().ok_or_else(|| {
                ScriptError::ContractInteraction(format!("not an address: {value:?}"))
            })
        })
        .collect()
}
