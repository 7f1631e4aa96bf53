use chrono::{Days, NaiveDate, NaiveDateTime};
use coleta_core::{
    clock::FixedClock,
    config::ReportConfig,
    error::ReportError,
    model::{CollectionRecord, Cooperative, PickupEvent, PickupStatus, PriceCatalogEntry},
    reporting::{ReportKind, ReportOutput, ReportRequest, ReportingService},
    source::InMemorySource,
    types::Subject,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 15).unwrap().and_hms_opt(8, 30, 0).unwrap()
}

fn cooperative(id: i64, name: &str, tax_id: &str, email: &str) -> Cooperative {
    Cooperative { id, name: name.into(), tax_id: tax_id.into(), email: email.into() }
}

fn service(source: InMemorySource) -> ReportingService<InMemorySource, FixedClock> {
    ReportingService::new(source, FixedClock(now()), ReportConfig::default()).unwrap()
}

fn text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).expect("utf-8 export")
}

fn recicla() -> InMemorySource {
    InMemorySource::new()
        .with_cooperative(cooperative(1, "Recicla+", "12345678901234", "a@b.com"))
        .with_price(PriceCatalogEntry {
            id: 1,
            cooperative_id: 1,
            material: "PET".into(),
            unit_price: 1.5,
        })
}

// ── Flat file ────────────────────────────────────────────────────────────────

#[test]
fn flat_file_matches_fixed_layout() {
    let export = service(recicla()).cooperative_flat_file(1).unwrap();
    assert_eq!(export.file_name, "cooperativa_1.txt");

    let body = text(export.bytes);
    let lines: Vec<&str> = body.split('\n').collect();
    assert_eq!(
        lines,
        [
            "00COOPERATIVA15-05-2024 08:30:00",
            "02Recicla+                 12345678901234  a@b.com                       ",
            "03Material-PET     1.50",
            "03Material-Ferro   0.00",
            "03Material-Papelão 0.00",
            "03Material-Alumínio0.00",
            "01         5",
        ]
    );
    assert!(!body.ends_with('\n'));
}

#[test]
fn flat_file_for_unknown_cooperative_is_not_found() {
    let err = service(recicla()).cooperative_flat_file(9).unwrap_err();
    assert!(matches!(err, ReportError::NotFound { entity: "cooperative", id: 9 }));
}

#[test]
fn flat_file_ignores_non_canonical_materials() {
    let source = recicla().with_price(PriceCatalogEntry {
        id: 2,
        cooperative_id: 1,
        material: "Vidro".into(),
        unit_price: 0.1,
    });
    let body = text(service(source).cooperative_flat_file(1).unwrap().bytes);
    assert!(!body.contains("Vidro"));
    assert!(body.ends_with("01         5"));
}

// ── CSV ──────────────────────────────────────────────────────────────────────

#[test]
fn empty_csv_exports_are_header_only() {
    let reports = service(InMemorySource::new());
    let coop = Subject::Cooperative(1);

    assert_eq!(text(reports.cooperatives_csv(None).unwrap().bytes), "Id;Nome;Email;CNPJ\n");
    assert_eq!(text(reports.kg_per_month_csv(coop).unwrap().bytes), "Mês;Valores\n");
    assert_eq!(text(reports.value_per_month_csv(coop).unwrap().bytes), "Mês;Valor\n");
}

#[test]
fn cooperatives_csv_orders_by_tax_id() {
    let source = InMemorySource::new()
        .with_cooperative(cooperative(1, "Zeta", "99000000000000", "z@coop.org"))
        .with_cooperative(cooperative(2, "Alfa", "11000000000000", "a@coop.org"));
    let reports = service(source);

    let all = text(reports.cooperatives_csv(None).unwrap().bytes);
    assert_eq!(
        all,
        "Id;Nome;Email;CNPJ\n2;Alfa;a@coop.org;11000000000000\n1;Zeta;z@coop.org;99000000000000\n"
    );

    let one = text(reports.cooperatives_csv(Some(1)).unwrap().bytes);
    assert_eq!(one, "Id;Nome;Email;CNPJ\n1;Zeta;z@coop.org;99000000000000\n");
}

#[test]
fn monthly_csv_rows_flatten_materials() {
    let pet = PriceCatalogEntry { id: 1, cooperative_id: 1, material: "PET".into(), unit_price: 2.0 };
    let retrieved = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap().and_hms_opt(10, 0, 0).unwrap();
    let pickup = PickupEvent {
        id: 1,
        cooperative_id: 1,
        condominium_id: 4,
        scheduled_at: retrieved,
        retrieved_at: retrieved,
        bag_count: 1,
        status: PickupStatus::Completed,
    };
    let record = |id, kg: f64| CollectionRecord {
        id,
        quantity_kg: kg,
        value: kg * 2.0,
        material: pet.clone(),
        pickup: pickup.clone(),
    };
    let reports = service(InMemorySource::new().with_record(record(1, 1.5)).with_record(record(2, 2.0)));
    let coop = Subject::Cooperative(1);

    assert_eq!(
        text(reports.kg_per_month_csv(coop).unwrap().bytes),
        "Mês;Valores\nMAY/2024;PET:3.5,\n"
    );
    assert_eq!(
        text(reports.value_per_month_csv(coop).unwrap().bytes),
        "Mês;Valor\nMAY/2024;7.0\n"
    );
}

// ── Dispatch ─────────────────────────────────────────────────────────────────

#[test]
fn report_names_round_trip_through_dispatch() {
    let reports = service(recicla());

    let request = ReportRequest {
        kind: "flat-file".parse().unwrap(),
        subject: Some(Subject::Cooperative(1)),
        from: None,
    };
    match reports.run(&request).unwrap() {
        ReportOutput::File(export) => assert!(export.bytes.starts_with(b"00COOPERATIVA")),
        other => panic!("expected a file, got {other:?}"),
    }

    let request = ReportRequest {
        kind: ReportKind::WeeklyCurve,
        subject: Some(Subject::Cooperative(1)),
        from: None,
    };
    match reports.run(&request).unwrap() {
        ReportOutput::Structured(json) => assert_eq!(json.as_array().map(Vec::len), Some(7)),
        other => panic!("expected structured output, got {other:?}"),
    }
}

#[test]
fn dispatch_rejects_missing_subject_and_unknown_names() {
    let reports = service(recicla());
    let request = ReportRequest { kind: ReportKind::MaterialMix, subject: None, from: None };
    assert!(reports.run(&request).is_err());
    assert!("no-such-report".parse::<ReportKind>().is_err());
}

#[test]
fn daily_curve_near_calendar_end_is_invalid_range() {
    let reports = service(recicla());
    let from = NaiveDate::MAX - Days::new(3);
    let request = ReportRequest {
        kind: ReportKind::DailyCurve,
        subject: Some(Subject::Cooperative(1)),
        from: Some(from),
    };
    let err = reports.run(&request).unwrap_err();
    assert!(matches!(err, ReportError::InvalidDateRange { start, .. } if start == from));
}
