//! Deterministic demo data for local runs.
//!
//! Every value is drawn from one Pcg64Mcg stream seeded by --seed, so the
//! same seed always produces the same database.

use anyhow::Result;
use chrono::{Duration, NaiveDateTime};
use coleta_core::{
    model::{Cooperative, NewCollection, PickupEvent, PickupStatus, PriceCatalogEntry},
    store::SqliteStore,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

const MATERIALS: [(&str, f64); 5] = [
    ("PET", 1.80),
    ("Ferro", 0.45),
    ("Papelão", 0.60),
    ("Alumínio", 5.20),
    ("Vidro", 0.15),
];

const CONDOMINIUMS: [i64; 4] = [101, 102, 103, 104];

pub struct DemoSummary {
    pub cooperatives: usize,
    pub pickups:      usize,
    pub collections:  usize,
}

pub fn seed_demo(store: &SqliteStore, seed: u64, now: NaiveDateTime, days: i64) -> Result<DemoSummary> {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);

    let cooperatives = [
        Cooperative {
            id: 1,
            name: "Recicla+".into(),
            tax_id: "12345678901234".into(),
            email: "contato@reciclamais.org".into(),
        },
        Cooperative {
            id: 2,
            name: "Cooperativa Verde Vale".into(),
            tax_id: "04567890000112".into(),
            email: "verdevale@coop.org".into(),
        },
    ];

    let mut next_price_id = 1;
    for coop in &cooperatives {
        store.insert_cooperative(coop)?;
        // Each cooperative prices a random subset of the catalog.
        for (material, base_price) in MATERIALS {
            if rng.gen_bool(0.8) {
                store.insert_price_entry(&PriceCatalogEntry {
                    id: next_price_id,
                    cooperative_id: coop.id,
                    material: material.into(),
                    unit_price: (base_price * rng.gen_range(0.8..1.2) * 100.0).round() / 100.0,
                })?;
                next_price_id += 1;
            }
        }
    }

    let mut pickups = 0;
    let mut collections = 0;
    for day in 0..days {
        let scheduled_at = now - Duration::days(days - day) + Duration::hours(rng.gen_range(7..17));
        for coop in &cooperatives {
            if !rng.gen_bool(0.6) {
                continue;
            }
            let catalog = store.price_entries_for_cooperative(coop.id)?;
            if catalog.is_empty() {
                continue;
            }

            pickups += 1;
            let pickup = PickupEvent {
                id: pickups as i64,
                cooperative_id: coop.id,
                condominium_id: CONDOMINIUMS[rng.gen_range(0..CONDOMINIUMS.len())],
                scheduled_at,
                retrieved_at: scheduled_at + Duration::hours(rng.gen_range(0..48)),
                bag_count: rng.gen_range(1..12),
                status: PickupStatus::Completed,
            };
            store.insert_pickup_event(&pickup)?;

            for _ in 0..rng.gen_range(1..=3) {
                let entry = &catalog[rng.gen_range(0..catalog.len())];
                store.register_collection(&NewCollection {
                    price_entry_id: entry.id,
                    pickup_event_id: pickup.id,
                    quantity_kg: (rng.gen_range(0.5..40.0_f64) * 10.0).round() / 10.0,
                })?;
                collections += 1;
            }
        }
    }

    Ok(DemoSummary {
        cooperatives: cooperatives.len(),
        pickups,
        collections,
    })
}
