//! Decoder registration and dispatch.
//!
//! A [Registry] tries every enabled decoder against a [BitBuffer]. Decoders are
//! grouped by [Protocol::priority]; a group only runs if every group with a lower
//! priority value produced no records. Each decoder keeps counters of its
//! outcomes, see [Stats].
//!
//! [Dispatcher] runs the same algorithm on a rayon thread pool, either trying the
//! decoders of a group concurrently against one buffer or decoding many buffers in
//! parallel. Results are always returned in registration (or input) order.
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rayon::prelude::*;
use tracing::{debug, span, trace, warn, Level};
use typed_builder::TypedBuilder;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    bitbuffer::BitBuffer,
    decoder::{DecodeError, Decoder, Protocol},
    devices,
    error::{Error, Result},
    record::Record,
};

/// Snapshot of a decoder's outcome counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Stats {
    /// Number of buffers the decoder was tried on.
    pub events: u64,
    /// Number of buffers that produced a record.
    pub ok: u64,
    /// Failures per kind, indexed by [DecodeError::kind_index].
    pub fails: [u64; DecodeError::KINDS],
}

impl Stats {
    #[must_use]
    pub fn failures(&self, kind: DecodeError) -> u64 {
        self.fails[kind.kind_index()]
    }
}

#[derive(Default)]
struct Counters {
    events: AtomicU64,
    ok: AtomicU64,
    fails: [AtomicU64; DecodeError::KINDS],
}

struct Entry {
    decoder: Box<dyn Decoder>,
    enabled: AtomicBool,
    counters: Counters,
}

impl Entry {
    fn protocol(&self) -> &Protocol {
        self.decoder.protocol()
    }

    fn run(&self, bits: &BitBuffer) -> Option<Record> {
        let protocol = self.protocol();
        self.counters.events.fetch_add(1, Ordering::Relaxed);
        match self.decoder.decode(bits) {
            Ok(record) => {
                self.counters.ok.fetch_add(1, Ordering::Relaxed);
                if !protocol.conforms(&record) {
                    warn!(
                        protocol = protocol.name(),
                        "record does not match declared fields: {record}"
                    );
                }
                debug!(protocol = protocol.name(), "decoded {record}");
                Some(record)
            }
            Err(err) => {
                self.counters.fails[err.kind_index()].fetch_add(1, Ordering::Relaxed);
                trace!(protocol = protocol.name(), %err, "no record");
                None
            }
        }
    }

    fn stats(&self) -> Stats {
        let mut fails = [0; DecodeError::KINDS];
        for (dst, src) in fails.iter_mut().zip(&self.counters.fails) {
            *dst = src.load(Ordering::Relaxed);
        }
        Stats {
            events: self.counters.events.load(Ordering::Relaxed),
            ok: self.counters.ok.load(Ordering::Relaxed),
            fails,
        }
    }
}

/// Collection of decoders tried against each buffer.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the decoders in [devices](crate::devices).
    #[must_use]
    pub fn with_reference_devices() -> Self {
        let mut registry = Self::new();
        for decoder in devices::all() {
            registry.register_boxed(decoder);
        }
        registry
    }

    /// Add a decoder, enabled unless its protocol is disabled by default.
    pub fn register<D: Decoder + 'static>(&mut self, decoder: D) -> &mut Self {
        self.register_boxed(Box::new(decoder))
    }

    pub fn register_boxed(&mut self, decoder: Box<dyn Decoder>) -> &mut Self {
        let enabled = !decoder.protocol().disabled();
        debug!(protocol = decoder.protocol().name(), enabled, "registered");
        self.entries.push(Entry {
            decoder,
            enabled: AtomicBool::new(enabled),
            counters: Counters::default(),
        });
        self
    }

    /// Protocols of all registered decoders, in registration order.
    pub fn protocols(&self) -> impl Iterator<Item = &Protocol> {
        self.entries.iter().map(Entry::protocol)
    }

    fn entry(&self, name: &str) -> Result<&Entry> {
        self.entries
            .iter()
            .find(|e| e.protocol().name() == name)
            .ok_or_else(|| Error::UnknownProtocol(name.to_string()))
    }

    /// Enable or disable the decoder for the protocol `name`.
    ///
    /// # Errors
    /// [Error::UnknownProtocol] if no registered decoder has that name.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        self.entry(name)?.enabled.store(enabled, Ordering::Relaxed);
        Ok(())
    }

    /// # Errors
    /// [Error::UnknownProtocol] if no registered decoder has that name.
    pub fn is_enabled(&self, name: &str) -> Result<bool> {
        Ok(self.entry(name)?.enabled.load(Ordering::Relaxed))
    }

    /// # Errors
    /// [Error::UnknownProtocol] if no registered decoder has that name.
    pub fn stats(&self, name: &str) -> Result<Stats> {
        Ok(self.entry(name)?.stats())
    }

    /// Enabled entries grouped by ascending priority, each group in registration order.
    fn groups(&self) -> BTreeMap<u32, Vec<&Entry>> {
        let mut groups: BTreeMap<u32, Vec<&Entry>> = BTreeMap::new();
        for entry in &self.entries {
            if entry.enabled.load(Ordering::Relaxed) {
                groups
                    .entry(entry.protocol().priority())
                    .or_default()
                    .push(entry);
            }
        }
        groups
    }

    /// Try all enabled decoders against `bits`, returning the records produced by
    /// the first priority group that produced any.
    #[must_use]
    pub fn decode(&self, bits: &BitBuffer) -> Vec<Record> {
        let _span = span!(Level::TRACE, "decode", rows = bits.num_rows()).entered();
        for (priority, group) in self.groups() {
            let records: Vec<Record> = group.iter().filter_map(|e| e.run(bits)).collect();
            if !records.is_empty() {
                trace!(priority, count = records.len(), "group produced records");
                return records;
            }
        }
        Vec::new()
    }
}

/// Configuration for a [Dispatcher].
#[derive(Clone, Debug, Default, PartialEq, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct DispatchConfig {
    /// Size of the worker pool. By default the value will be chosen automatically.
    #[builder(default)]
    pub num_threads: usize,
    /// Names of protocols to disable.
    #[builder(default, setter(into))]
    pub disabled: Vec<String>,
    /// Names of protocols to enable, e.g., ones disabled by default.
    #[builder(default, setter(into))]
    pub enabled: Vec<String>,
}

/// Parallel dispatch of a [Registry] on a dedicated thread pool.
pub struct Dispatcher {
    registry: Registry,
    pool: rayon::ThreadPool,
}

impl Dispatcher {
    /// # Errors
    /// [Error::UnknownProtocol] if the config names an unregistered protocol, or
    /// [Error::ThreadPool] if the pool could not be constructed.
    pub fn new(registry: Registry, config: &DispatchConfig) -> Result<Self> {
        for name in &config.disabled {
            registry.set_enabled(name, false)?;
        }
        for name in &config.enabled {
            registry.set_enabled(name, true)?;
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("dispatch::decode{i}"))
            .num_threads(config.num_threads)
            .build()?;
        debug!(threads = pool.current_num_threads(), "dispatcher started");
        Ok(Dispatcher { registry, pool })
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Like [Registry::decode], but the decoders of each priority group are tried
    /// concurrently.
    #[must_use]
    pub fn decode(&self, bits: &BitBuffer) -> Vec<Record> {
        self.pool.install(|| {
            for (_, group) in self.registry.groups() {
                let records: Vec<Record> =
                    group.par_iter().filter_map(|e| e.run(bits)).collect();
                if !records.is_empty() {
                    return records;
                }
            }
            Vec::new()
        })
    }

    /// Decode many buffers in parallel. The result for each buffer is at the same
    /// index as the buffer.
    #[must_use]
    pub fn decode_all(&self, buffers: &[BitBuffer]) -> Vec<Vec<Record>> {
        self.pool.install(|| {
            buffers
                .par_iter()
                .map(|bits| self.registry.decode(bits))
                .collect()
        })
    }
}
