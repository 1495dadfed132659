// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Metadata cache backed by `moka`, with a TTL carried by each entry.

use crate::domain::entities::ColumnRecord;
use crate::ports::cache_port::MetadataCache;
use log::trace;
use moka::sync::Cache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct Entry {
    columns: Arc<Vec<ColumnRecord>>,
    ttl: Duration,
}

struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// `MetadataCache` implementation shared across threads.
pub struct MokaMetadataCache {
    entries: Cache<String, Entry>,
}

impl MokaMetadataCache {
    pub fn new(max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .name("describe-metadata")
            .build();
        Self { entries }
    }
}

impl MetadataCache for MokaMetadataCache {
    fn get(&self, key: &str) -> Option<Vec<ColumnRecord>> {
        let hit = self.entries.get(key);
        if hit.is_some() {
            trace!("Cache hit for {}", key);
        } else {
            trace!("Cache miss for {}", key);
        }
        hit.map(|entry| (*entry.columns).clone())
    }

    fn put(&self, key: &str, columns: Vec<ColumnRecord>, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            Entry {
                columns: Arc::new(columns),
                ttl,
            },
        );
    }
}
