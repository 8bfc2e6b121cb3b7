//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `fitguide_core` linkage without the Flutter/FFI runtime.
//! - Walk one save-under-overlay flow and print deterministic output.

use fitguide_core::{
    init_logging_from_config, run_boundary, CoreConfig, FaultReport, Record, ScopeError, Session,
};
use serde_json::json;

fn main() {
    println!("fitguide_core ping={}", fitguide_core::ping());
    println!("fitguide_core version={}", fitguide_core::core_version());

    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    if let Err(report) = run_scenario(&config) {
        eprintln!("fault: {report}");
        std::process::exit(1);
    }
}

fn run_scenario(config: &CoreConfig) -> Result<(), FaultReport> {
    let session: Session = Session::start(config);
    run_boundary("cli", || {
        session.run(|ctx| -> Result<(), ScopeError> {
            let loading = ctx.loading()?;
            let safety = ctx.safety()?;

            loading.start_loading("Saving…");
            print_loading("start", &loading.state());
            safety.add_pain_entry(record(json!({"severity": 3, "note": "left knee"})));
            safety.add_emergency_contact(record(json!({"name": "Ana", "relationship": "sister"})));
            loading.stop_loading();
            print_loading("stop", &loading.state());

            for entry in safety.pain_entries() {
                println!(
                    "pain_entry sequence={} recorded_at={}",
                    entry.sequence(),
                    entry.recorded_at()
                );
            }
            Ok(())
        })
    })?;

    let summary = session.end();
    println!(
        "session_end pain_entries={} emergency_contacts={} left_busy={}",
        summary.pain_entries, summary.emergency_contacts, summary.left_busy
    );
    Ok(())
}

fn print_loading(step: &str, state: &fitguide_core::LoadingState) {
    println!("loading {step} busy={} message={:?}", state.busy, state.message);
}

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(record) => record,
        _ => Record::new(),
    }
}
