use tracing::info;
use tracing_subscriber::EnvFilter;

use sclmask::{
    DatasetType, Error, MaskParams, OutputEncoding, SclClass, mask_files_to_path,
    process_safe_to_path,
};

use super::args::CliArgs;

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Build masking parameters from a JSON preset or from the individual flags.
pub fn build_params(args: &CliArgs) -> sclmask::Result<MaskParams> {
    if let Some(path) = &args.params {
        info!("Loading parameters from {:?}", path);
        return MaskParams::from_json_file(path);
    }

    // Same order as SclClass::ALL, so position == SCL code
    let flags = [
        args.no_data,
        args.saturated_or_defective,
        args.dark_area_pixels,
        args.cloud_shadows,
        args.vegetation,
        args.not_vegetated,
        args.water,
        args.unclassified,
        args.cloud_medium_probability,
        args.cloud_high_probability,
        args.thin_cirrus,
        args.snow,
    ];
    let keep: Vec<SclClass> = SclClass::ALL
        .iter()
        .zip(flags)
        .filter_map(|(&class, on)| on.then_some(class))
        .collect();

    let dataset = if args.s2oli {
        DatasetType::S2Oli
    } else if args.s2tm {
        DatasetType::S2Tm
    } else {
        DatasetType::Sentinel2
    };

    Ok(MaskParams {
        keep,
        encoding: if args.uint8 {
            OutputEncoding::Byte
        } else {
            OutputEncoding::Native
        },
        dataset,
        target_crs: args.prjstr.clone(),
    })
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);
    let start = chrono::Utc::now();

    let params = build_params(&args)?;

    let report = match (&args.safefile, &args.infile, &args.maskfile) {
        (Some(safe), _, _) => process_safe_to_path(safe, &args.outpath, &params)?,
        (None, Some(infile), Some(maskfile)) => {
            mask_files_to_path(infile, maskfile, &args.outpath, &params)?
        }
        _ => {
            return Err(Error::InvalidInputCombination(
                "if --safefile is not set, then both --infile and --maskfile must be".to_string(),
            )
            .into());
        }
    };

    info!(
        "Saved {:?}: {} bands, {} rows, {} columns, {} good pixels, {}",
        report.output,
        report.bands,
        report.rows,
        report.cols,
        report.included_pixels,
        report.pixel_type
    );
    let elapsed = chrono::Utc::now() - start;
    info!(
        "Total time: {:.2} seconds",
        elapsed.num_milliseconds() as f64 / 1000.0
    );
    info!("Processing complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["sclmask", "--outpath", "/tmp/out"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_keep_vegetation_bare_soil_and_unclassified() {
        let params = build_params(&parse(&[])).unwrap();
        assert_eq!(params.keep, SclClass::DEFAULT_KEEP.to_vec());
        assert_eq!(params.encoding, OutputEncoding::Byte);
        assert_eq!(params.dataset, DatasetType::Sentinel2);
        assert_eq!(params.target_crs, None);
    }

    #[test]
    fn class_switches_accept_optional_values() {
        let params = build_params(&parse(&[
            "--snow",
            "--water",
            "true",
            "--vegetation",
            "false",
            "--uint8",
            "false",
        ]))
        .unwrap();
        assert_eq!(
            params.keep,
            vec![
                SclClass::NotVegetated,
                SclClass::Water,
                SclClass::Unclassified,
                SclClass::Snow
            ]
        );
        assert_eq!(params.encoding, OutputEncoding::Native);
    }

    #[test]
    fn oli_takes_precedence_over_tm() {
        let params = build_params(&parse(&["--S2TM", "--S2OLI", "--prjstr", "EPSG:2172"])).unwrap();
        assert_eq!(params.dataset, DatasetType::S2Oli);
        assert_eq!(params.target_crs.as_deref(), Some("EPSG:2172"));
        let params = build_params(&parse(&["--S2TM"])).unwrap();
        assert_eq!(params.dataset, DatasetType::S2Tm);
    }

    #[test]
    fn outpath_is_required() {
        assert!(CliArgs::try_parse_from(["sclmask", "-i", "a.tif", "-m", "b.tif"]).is_err());
    }

    #[test]
    fn preset_file_replaces_flags() {
        let tmp = tempfile::tempdir().unwrap();
        let preset = tmp.path().join("preset.json");
        std::fs::write(&preset, r#"{"keep": ["snow"], "encoding": "native"}"#).unwrap();
        let params = build_params(&parse(&["--water", "--params", preset.to_str().unwrap()])).unwrap();
        assert_eq!(params.keep, vec![SclClass::Snow]);
        assert_eq!(params.encoding, OutputEncoding::Native);
    }

    #[test]
    fn missing_pair_is_an_invalid_combination() {
        let err = run(parse(&["--infile", "/tmp/only_image.tif"])).unwrap_err();
        let err = err.downcast::<Error>().unwrap();
        assert!(matches!(*err, Error::InvalidInputCombination(_)));
    }
}
