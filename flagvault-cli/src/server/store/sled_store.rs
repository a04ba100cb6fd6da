use async_trait::async_trait;
use chrono::Utc;
use flagvault_lib::{Flag, FlagError, FlagStore, FlagValue, RequestContext};

/// Persistent flag storage backed by sled. One JSON record per flag under
/// `flag:{name}`.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn new(db: sled::Db) -> Self {
        Self { db }
    }

    /// Open a sled database at the given directory path.
    pub fn open(data_dir: &str) -> Result<Self, FlagError> {
        let db = sled::open(data_dir).map_err(infra("failed to open sled db"))?;
        Ok(Self::new(db))
    }

    fn flag_key(name: &str) -> String {
        format!("flag:{}", name)
    }

    fn flush(&self) -> Result<(), FlagError> {
        self.db.flush().map_err(infra("failed to flush"))?;
        Ok(())
    }
}

fn infra(what: &'static str) -> impl FnOnce(sled::Error) -> FlagError {
    move |e| FlagError::Infra(format!("{}: {}", what, e))
}

fn encode(flag: &Flag) -> Result<Vec<u8>, FlagError> {
    serde_json::to_vec(flag).map_err(|e| FlagError::Infra(format!("failed to serialize flag: {}", e)))
}

fn decode(bytes: &[u8]) -> Result<Flag, FlagError> {
    serde_json::from_slice(bytes)
        .map_err(|e| FlagError::Infra(format!("failed to deserialize flag: {}", e)))
}

#[async_trait]
impl FlagStore for SledStore {
    async fn create(&self, ctx: &RequestContext, flag: &Flag) -> Result<(), FlagError> {
        let record = encode(flag)?;
        ctx.check()?;

        // Insert only if absent: a taken key is the uniqueness violation.
        let swapped = self
            .db
            .compare_and_swap(Self::flag_key(&flag.name), None::<&[u8]>, Some(record))
            .map_err(infra("failed to store flag"))?;
        if swapped.is_err() {
            return Err(FlagError::AlreadyExists);
        }

        self.flush()
    }

    async fn get_by_name(&self, _ctx: &RequestContext, name: &str) -> Result<Flag, FlagError> {
        let record = self
            .db
            .get(Self::flag_key(name))
            .map_err(infra("failed to read flag"))?
            .ok_or(FlagError::NotFound)?;
        decode(&record)
    }

    async fn update_value(
        &self,
        ctx: &RequestContext,
        name: &str,
        value: FlagValue,
    ) -> Result<Flag, FlagError> {
        ctx.check()?;
        let now = Utc::now();

        // sled may retry the closure under contention; it must stay pure apart
        // from remembering the last failure.
        let mut failure = None;
        let record = self
            .db
            .update_and_fetch(Self::flag_key(name), |old| {
                failure = None;
                let old = old?;
                let rewritten = decode(old).and_then(|mut flag| {
                    flag.value = value;
                    flag.updated_at = now;
                    encode(&flag)
                });
                match rewritten {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        failure = Some(e);
                        Some(old.to_vec())
                    }
                }
            })
            .map_err(infra("failed to update flag"))?;

        if let Some(err) = failure {
            return Err(err);
        }
        let record = record.ok_or(FlagError::NotFound)?;
        self.flush()?;
        decode(&record)
    }
}
