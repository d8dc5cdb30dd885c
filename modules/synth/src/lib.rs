//! Synthetic inventory and signal fabrication for demos and fixtures.

use anyhow::{anyhow, Result};
use hostwatch_core::{format_timestamp, HostInventoryRecord, SignalRecord};
use ipnet::Ipv4Net;
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use time::{Duration, PrimitiveDateTime};

pub const PURPOSES: &[&str] = &["webserver", "database", "mailserver", "fileserver", "dns", "proxy"];
pub const CLASSIFICATIONS: &[&str] = &["production", "staging", "development"];

pub const DEFAULT_HOSTS: usize = 100;
pub const DEFAULT_ANTIVIRUS_RECORDS: usize = 80;
pub const DEFAULT_LOG_RECORDS: usize = 70;
pub const DEFAULT_CIDR: &str = "10.0.0.0/16";

const SECS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone)]
pub struct SynthOptions {
    pub hosts: usize,
    pub antivirus: usize,
    pub logs: usize,
    pub cidr: Ipv4Net,
    pub seed: Option<u64>,
}

impl Default for SynthOptions {
    fn default() -> Self {
        SynthOptions {
            hosts: DEFAULT_HOSTS,
            antivirus: DEFAULT_ANTIVIRUS_RECORDS,
            logs: DEFAULT_LOG_RECORDS,
            cidr: DEFAULT_CIDR.parse().unwrap_or_default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub inventory: Vec<HostInventoryRecord>,
    pub antivirus: Vec<SignalRecord>,
    pub logs: Vec<SignalRecord>,
}

/// Build a full dataset relative to `now`.
pub fn generate(opts: &SynthOptions, now: PrimitiveDateTime) -> Result<Dataset> {
    let mut rng = match opts.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let inventory = generate_inventory(&mut rng, opts.hosts, opts.cidr)?;
    let antivirus = generate_antivirus(&mut rng, &inventory, opts.antivirus, now);
    let logs = generate_logs(&mut rng, &inventory, opts.logs, now);
    Ok(Dataset { inventory, antivirus, logs })
}

/// First usable address and count, matching `Ipv4Net::hosts` semantics.
fn address_pool(net: Ipv4Net) -> (u32, usize) {
    let first = u32::from(net.network());
    let size = 1u64 << (32 - u32::from(net.prefix_len()));
    if net.prefix_len() >= 31 {
        (first, size as usize)
    } else {
        (first + 1, (size - 2) as usize)
    }
}

/// `count` hosts with distinct addresses from `cidr`, hostnames `<purpose>-<nnn>`.
pub fn generate_inventory<R: Rng>(rng: &mut R, count: usize, cidr: Ipv4Net) -> Result<Vec<HostInventoryRecord>> {
    let (first, pool) = address_pool(cidr);
    if count > pool {
        return Err(anyhow!("{cidr} has {pool} usable addresses, {count} hosts requested"));
    }
    let mut per_purpose: HashMap<&str, usize> = HashMap::new();
    let mut hosts = Vec::with_capacity(count);
    for offset in index::sample(rng, pool, count).into_iter() {
        let purpose = PURPOSES[rng.gen_range(0..PURPOSES.len())];
        let classification = CLASSIFICATIONS[rng.gen_range(0..CLASSIFICATIONS.len())];
        let n = per_purpose.entry(purpose).or_insert(0);
        *n += 1;
        hosts.push(HostInventoryRecord {
            address: Ipv4Addr::from(first + offset as u32).to_string(),
            hostname: format!("{purpose}-{n:03}"),
            purpose: purpose.to_string(),
            classification: classification.to_string(),
        });
    }
    Ok(hosts)
}

fn sample_hosts<'a, R: Rng>(rng: &mut R, inventory: &'a [HostInventoryRecord], wanted: usize, what: &str) -> Vec<&'a HostInventoryRecord> {
    if inventory.len() < wanted {
        tracing::warn!(available = inventory.len(), requested = wanted, "fewer hosts than requested {what} records, using all");
    }
    inventory.choose_multiple(rng, wanted.min(inventory.len())).collect()
}

fn uniform_between<R: Rng>(rng: &mut R, start: PrimitiveDateTime, end: PrimitiveDateTime) -> PrimitiveDateTime {
    let span = (end - start).whole_seconds().max(0);
    start + Duration::seconds(rng.gen_range(0..=span))
}

/// Antivirus timestamps: uniform between a window start of 0..=730 days ago and `now`.
pub fn generate_antivirus<R: Rng>(rng: &mut R, inventory: &[HostInventoryRecord], count: usize, now: PrimitiveDateTime) -> Vec<SignalRecord> {
    sample_hosts(rng, inventory, count, "antivirus")
        .into_iter()
        .map(|h| {
            let start = now - Duration::days(rng.gen_range(0..=730));
            SignalRecord::new(h.address.clone(), format_timestamp(uniform_between(rng, start, now)))
        })
        .collect()
}

/// Log timestamps: a window start between 365 and 90 days ago, then uniform up to `now`.
pub fn generate_logs<R: Rng>(rng: &mut R, inventory: &[HostInventoryRecord], count: usize, now: PrimitiveDateTime) -> Vec<SignalRecord> {
    let earliest = now - Duration::days(365);
    let latest = now - Duration::days(90);
    let window_days = (latest - earliest).whole_days();
    sample_hosts(rng, inventory, count, "log")
        .into_iter()
        .map(|h| {
            let start = earliest + Duration::seconds(rng.gen_range(0..=window_days) * SECS_PER_DAY);
            SignalRecord::new(h.address.clone(), format_timestamp(uniform_between(rng, start, now)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwatch_core::parse_timestamp;
    use std::collections::HashSet;
    use time::macros::datetime;

    const NOW: PrimitiveDateTime = datetime!(2024-06-15 12:00:00);

    fn opts(hosts: usize, seed: u64) -> SynthOptions {
        SynthOptions { hosts, seed: Some(seed), ..SynthOptions::default() }
    }

    #[test]
    fn inventory_addresses_are_distinct_and_in_range() {
        let cidr: Ipv4Net = "192.168.1.0/24".parse().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let hosts = generate_inventory(&mut rng, 254, cidr).unwrap();
        let addrs: HashSet<_> = hosts.iter().map(|h| h.address.clone()).collect();
        assert_eq!(addrs.len(), 254);
        assert!(!addrs.contains("192.168.1.0"));
        assert!(!addrs.contains("192.168.1.255"));
        assert!(hosts.iter().all(|h| h.hostname.starts_with(&h.purpose)));
    }

    #[test]
    fn inventory_larger_than_cidr_is_rejected() {
        let cidr: Ipv4Net = "192.168.1.0/30".parse().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(generate_inventory(&mut rng, 3, cidr).is_err());
        assert_eq!(generate_inventory(&mut rng, 2, cidr).unwrap().len(), 2);
    }

    #[test]
    fn signal_counts_are_capped_by_inventory() {
        let d = generate(&opts(100, 1), NOW).unwrap();
        assert_eq!(d.antivirus.len(), DEFAULT_ANTIVIRUS_RECORDS);
        assert_eq!(d.logs.len(), DEFAULT_LOG_RECORDS);
        let small = generate(&opts(10, 1), NOW).unwrap();
        assert_eq!(small.antivirus.len(), 10);
        assert_eq!(small.logs.len(), 10);
    }

    #[test]
    fn timestamps_fall_in_their_windows() {
        let d = generate(&opts(200, 3), NOW).unwrap();
        for s in &d.antivirus {
            let ts = parse_timestamp(s.timestamp.as_deref().unwrap()).unwrap();
            assert!(ts <= NOW && ts >= NOW - Duration::days(730));
        }
        for s in &d.logs {
            let ts = parse_timestamp(s.timestamp.as_deref().unwrap()).unwrap();
            assert!(ts <= NOW && ts >= NOW - Duration::days(365));
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generate(&opts(50, 42), NOW).unwrap();
        let b = generate(&opts(50, 42), NOW).unwrap();
        assert_eq!(a.inventory, b.inventory);
        assert_eq!(a.antivirus, b.antivirus);
        assert_eq!(a.logs, b.logs);
    }

    #[test]
    fn default_pool_is_a_slash_16() {
        let o = SynthOptions::default();
        assert_eq!(o.cidr.to_string(), DEFAULT_CIDR);
        assert_eq!(address_pool(o.cidr), (u32::from(Ipv4Addr::new(10, 0, 0, 1)), 65_534));
    }
}
