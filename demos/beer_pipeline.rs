//! Fetch -> persist -> analyze -> report, wired through the event bus.
//!
//! The fetch pipeline publishes each page of beers as it arrives, a
//! persistence subscriber stores them, and once all pages are in the
//! analysis pipeline publishes summary statistics that a logging
//! subscriber reports.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use tapline::{Error, Event, EventBus, Result, Subscriber};

#[derive(Debug, Clone)]
struct Beer {
    name: String,
    abv: Option<f64>,
    hops: Vec<String>,
}

#[derive(Debug, Event)]
struct BeerDataFetched {
    page: u32,
    beers: Vec<Beer>,
}

#[derive(Debug, Event)]
#[event(name = "analysis-complete")]
struct Summary {
    total_beers: usize,
    average_abv: Option<f64>,
    top_hops: Vec<(String, usize)>,
}

#[derive(Default)]
struct BeerStore {
    rows: Mutex<Vec<Beer>>,
}

impl BeerStore {
    fn summary(&self) -> Summary {
        let rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        let abvs: Vec<f64> = rows.iter().filter_map(|b| b.abv).collect();
        let mut hops: HashMap<&str, usize> = HashMap::new();
        for hop in rows.iter().flat_map(|b| b.hops.iter()) {
            *hops.entry(hop.as_str()).or_default() += 1;
        }
        let mut top_hops: Vec<_> = hops.into_iter().map(|(h, n)| (h.to_string(), n)).collect();
        top_hops.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_hops.truncate(3);

        Summary {
            total_beers: rows.len(),
            average_abv: (!abvs.is_empty()).then(|| abvs.iter().sum::<f64>() / abvs.len() as f64),
            top_hops,
        }
    }
}

/// Batch-inserts every fetched page.
struct Persistence(Arc<BeerStore>);

impl Subscriber<BeerDataFetched> for Persistence {
    fn on_event(&self, event: &BeerDataFetched) -> Result<()> {
        if event.beers.iter().any(|b| b.name.is_empty()) {
            return Err(Error::external(format!("page {} has unnamed beers", event.page)));
        }
        let mut rows = self.0.rows.lock().unwrap_or_else(|e| e.into_inner());
        rows.extend(event.beers.iter().cloned());
        tracing::info!(page = event.page, inserted = event.beers.len(), "Stored beers");
        Ok(())
    }

    fn name(&self) -> std::borrow::Cow<'static, str> {
        "persistence".into()
    }
}

fn fetch_page(page: u32) -> Vec<Beer> {
    let beer = |name: &str, abv: Option<f64>, hops: &[&str]| Beer {
        name: name.to_string(),
        abv,
        hops: hops.iter().map(|h| h.to_string()).collect(),
    };
    match page {
        1 => vec![
            beer("Buzz", Some(4.5), &["Fuggles", "First Gold", "Cascade"]),
            beer("Trashy Blonde", Some(4.1), &["Amarillo", "Simcoe", "First Gold"]),
        ],
        2 => vec![
            beer("Berliner Weisse", Some(4.2), &["Hallertauer Hersbrucker"]),
            beer("Pilsen Lager", Some(6.3), &["Saaz", "Cascade"]),
        ],
        _ => vec![beer("", None, &[])],
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let bus = EventBus::default();
    let store = Arc::new(BeerStore::default());

    bus.subscribe_handler::<BeerDataFetched, _>(Persistence(store.clone()))?;
    bus.subscribe(|summary: &Summary| {
        tracing::info!(
            total_beers = summary.total_beers,
            average_abv = ?summary.average_abv,
            top_hops = ?summary.top_hops,
            "Data analysis complete"
        );
        Ok(())
    })?;
    bus.start()?;

    let fetcher = bus.publisher();
    for page in 1..=3 {
        fetcher.publish(BeerDataFetched {
            page,
            beers: fetch_page(page),
        });
    }

    // Analysis reads the store, so let persistence catch up first.
    bus.wait_idle(Duration::from_secs(1));
    bus.publish(store.summary());

    bus.wait_idle(Duration::from_secs(1));
    bus.stop(true)
}
