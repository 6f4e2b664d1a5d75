//! Shared test doubles.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use dnscache::{DnsCacheError, Lookup, Result};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;

/// How the stub answers a hostname.
#[derive(Clone, Debug)]
pub enum Answer {
    Addrs(Vec<IpAddr>),
    Fail,
    Hang,
}

/// Scripted lookup capability. Unknown hostnames fail.
#[derive(Default)]
pub struct StubLookup {
    answers: Mutex<HashMap<String, Answer>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubLookup {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answer(&self, host: &str, addrs: &[&str]) {
        let addrs = addrs.iter().map(|a| a.parse().unwrap()).collect();
        self.answers
            .lock()
            .insert(host.to_string(), Answer::Addrs(addrs));
    }

    pub fn fail(&self, host: &str) {
        self.answers.lock().insert(host.to_string(), Answer::Fail);
    }

    pub fn hang(&self, host: &str) {
        self.answers.lock().insert(host.to_string(), Answer::Hang);
    }

    /// Number of lookups made for `host`.
    pub fn calls(&self, host: &str) -> usize {
        self.calls.lock().get(host).copied().unwrap_or(0)
    }
}

impl Lookup for StubLookup {
    fn lookup_ip<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<Vec<IpAddr>>> {
        *self.calls.lock().entry(host.to_string()).or_default() += 1;
        let answer = self
            .answers
            .lock()
            .get(host)
            .cloned()
            .unwrap_or(Answer::Fail);

        async move {
            match answer {
                Answer::Addrs(addrs) => Ok(addrs),
                Answer::Fail => Err(DnsCacheError::resolve(host, "no such host")),
                Answer::Hang => std::future::pending().await,
            }
        }
        .boxed()
    }
}

pub fn ips(addrs: &[&str]) -> Vec<IpAddr> {
    addrs.iter().map(|a| a.parse().unwrap()).collect()
}
