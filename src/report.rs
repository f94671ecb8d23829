//! Run reports.
//!
//! This module converts the results of the runs of a parameter sweep into the
//! JSON report schemas of [`dds_json`].

use crate::checker::{Channel, CheckError};
use crate::config::Config;
use crate::sweep::Run;
use chrono::prelude::*;
use dds_json::{RunReport, SweepReport};

/// Name and version of the program that produces the reports.
pub const GENERATOR: &str = concat!("dds-model v", env!("CARGO_PKG_VERSION"));

/// Gives the name of the LUT file of a configuration.
///
/// The name contains the address width and the entry width of the LUT, and
/// the extension of the LUT encoding, as in `sine_lut_9_16.hex`.
pub fn lut_file_name(config: &Config) -> String {
    format!(
        "sine_lut_{}_{}.{}",
        config.lut_address_width(),
        config.out_dw(),
        config.lut_encoding().extension()
    )
}

/// Formats a timestamp as used in the reports (RFC 3339, milliseconds).
pub fn timestamp(datetime: &DateTime<Utc>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Builds the report of a run.
///
/// If the run failed, the compared count is the index of the failing sample
/// pair. For a tolerance violation the error field of the violating channel
/// holds the violating difference.
pub fn run_report(run: &Run, lut_file: Option<String>, datetime: &DateTime<Utc>) -> RunReport {
    let (passed, compared, max_error_sin, max_error_cos, mismatch) = match &run.check {
        Ok(check) => (
            true,
            check.compared,
            check.max_error_sin,
            check.max_error_cos,
            None,
        ),
        Err(error @ CheckError::Mismatch(mismatch)) => {
            let difference = (i64::from(mismatch.device) - i64::from(mismatch.model)).abs();
            let (sin, cos) = match mismatch.channel {
                Channel::Sine => (difference, None),
                Channel::Cosine => (0, Some(difference)),
            };
            (false, mismatch.index, sin, cos, Some(error.to_string()))
        }
        Err(error @ CheckError::MissingSample { index, .. }) => (
            false,
            *index,
            0,
            run.config.sin_cos().then_some(0),
            Some(error.to_string()),
        ),
    };
    RunReport {
        config: run.config.into(),
        passed,
        compared,
        tolerance: run.tolerance,
        max_error_sin,
        max_error_cos,
        mismatch,
        latency: run.config.latency(),
        cycles: run.cycles,
        sfdr_db: run.sfdr_db,
        lut_file,
        datetime: timestamp(datetime),
    }
}

/// Builds the report of a sweep from the reports of its runs.
pub fn sweep_report(runs: Vec<RunReport>) -> SweepReport {
    let passed = runs.iter().filter(|run| run.passed).count();
    SweepReport {
        generator: GENERATOR.to_string(),
        passed,
        failed: runs.len() - passed,
        runs,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::checker::{CheckReport, Mismatch, Stream};
    use crate::lut::SineLut;

    fn run(config: Config, check: Result<CheckReport, CheckError>) -> Run {
        Run {
            config,
            lut: SineLut::for_config(&config).unwrap(),
            tolerance: 10,
            cycles: 105,
            check,
            sfdr_db: Some(96.5),
        }
    }

    fn datetime() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn file_names() {
        let config = Config::builder(20, 16).taylor(9).build().unwrap();
        assert_eq!(lut_file_name(&config), "sine_lut_9_16.hex");
        let config = Config::builder(8, 3).use_lut_file(false).build().unwrap();
        assert_eq!(lut_file_name(&config), "sine_lut_6_3.vh");
    }

    #[test]
    fn passed_run() {
        let config = Config::builder(20, 16)
            .taylor(9)
            .sin_cos(true)
            .build()
            .unwrap();
        let check = CheckReport {
            compared: 100,
            max_error_sin: 2,
            max_error_cos: Some(1),
        };
        let report = run_report(
            &run(config, Ok(check)),
            Some(lut_file_name(&config)),
            &datetime(),
        );
        assert!(report.passed);
        assert_eq!(report.compared, 100);
        assert_eq!(report.max_error_cos, Some(1));
        assert_eq!(report.latency, config.latency());
        assert_eq!(report.mismatch, None);
        assert_eq!(report.datetime, "2024-03-01T12:30:00.000Z");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["config"]["PHASE_DW"], 20);
        assert_eq!(json["config"]["LUT_DW"], 9);
        assert_eq!(json["lut_file"], "sine_lut_9_16.hex");
        assert!(json.get("mismatch").is_none());
    }

    #[test]
    fn failed_run() {
        let config = Config::builder(20, 16)
            .taylor(9)
            .sin_cos(true)
            .build()
            .unwrap();
        let mismatch = Mismatch {
            index: 42,
            channel: Channel::Cosine,
            device: -1011,
            model: -1000,
            tolerance: 10,
        };
        let report = run_report(&run(config, Err(mismatch.into())), None, &datetime());
        assert!(!report.passed);
        assert_eq!(report.compared, 42);
        assert_eq!(report.max_error_cos, Some(11));
        assert_eq!(
            report.mismatch.as_deref(),
            Some("[42] cos device: -1011 model: -1000 (tolerance 10)")
        );

        let missing = CheckError::MissingSample {
            index: 7,
            stream: Stream::Device,
        };
        let short = run_report(&run(config, Err(missing)), None, &datetime());
        assert!(!short.passed);
        assert_eq!(short.compared, 7);
        assert_eq!(short.max_error_cos, Some(0));
        assert_eq!(short.mismatch.as_deref(), Some("[7] device sample missing"));

        let sweep = sweep_report(vec![report, short]);
        assert_eq!(sweep.failed, 2);
        assert_eq!(sweep.passed, 0);
        assert!(sweep.generator.starts_with("dds-model v"));
    }
}
