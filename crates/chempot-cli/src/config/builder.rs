use super::defaults::DefaultsConfig;
use super::file::{FileBoundary, FileConfig};
use super::models::{AppConfig, BoundaryTarget};
use crate::cli::BuildArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use chempot::analysis::{AnalysisConfigBuilder, ChemicalPotentials, Frame};
use chempot::core::models::{Composition, Element};

pub fn build_config(args: &BuildArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = FileConfig::from_file(&args.config)?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let entries_path = args
        .entries
        .clone()
        .or(file_config.entries.take())
        .ok_or_else(|| {
            CliError::Config(
                "An entries file is required either in the config file ('entries') or via --entries."
                    .to_string(),
            )
        })?;

    let frame = file_config.frame.unwrap_or(defaults.frame);

    let analysis_file = file_config.analysis.take().unwrap_or_default();
    let analysis = AnalysisConfigBuilder::new()
        .stability_tolerance(
            analysis_file
                .stability_tolerance
                .unwrap_or(defaults.stability_tolerance),
        )
        .singular_tolerance(
            analysis_file
                .singular_tolerance
                .unwrap_or(defaults.singular_tolerance),
        )
        .build()?;

    let reservoirs = file_config.reservoirs.take().unwrap_or_default();
    let boundaries = file_config
        .boundaries
        .take()
        .unwrap_or_default()
        .into_iter()
        .map(resolve_boundary)
        .collect::<Result<Vec<_>>>()?;

    if reservoirs.is_empty() && boundaries.is_empty() {
        return Err(CliError::Config(
            "The configuration defines no [reservoirs] and no [[boundaries]].".to_string(),
        ));
    }

    Ok(AppConfig {
        entries_path,
        output_path: args.output.clone(),
        frame,
        analysis,
        reservoirs,
        boundaries,
    })
}

fn resolve_boundary(boundary: FileBoundary) -> Result<BoundaryTarget> {
    let composition: Composition = boundary.composition.parse().map_err(|e| {
        CliError::Config(format!(
            "Invalid boundary composition '{}': {}",
            boundary.composition, e
        ))
    })?;
    if boundary.fixed.len() != 1 {
        return Err(CliError::Config(format!(
            "Boundary of '{}' needs exactly one fixed potential, found {}.",
            boundary.composition,
            boundary.fixed.len()
        )));
    }
    Ok(BoundaryTarget {
        composition,
        fixed: boundary.fixed,
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value_str) =
            parser::parse_set_value(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;

        let float = || {
            parser::parse_finite(value_str).ok_or_else(|| {
                CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
            })
        };

        match key {
            "entries" => {
                config.entries = Some(value_str.into());
            }
            "frame" => {
                config.frame = Some(match value_str {
                    "absolute" => Frame::Absolute,
                    "referenced" => Frame::Referenced,
                    _ => {
                        return Err(CliError::Config(format!(
                            "Invalid frame '{}'. Expected 'absolute' or 'referenced'.",
                            value_str
                        )));
                    }
                });
            }
            "analysis.stability-tolerance" => {
                config
                    .analysis
                    .get_or_insert_with(Default::default)
                    .stability_tolerance = Some(float()?);
            }
            "analysis.singular-tolerance" => {
                config
                    .analysis
                    .get_or_insert_with(Default::default)
                    .singular_tolerance = Some(float()?);
            }
            _ if key.starts_with("reservoirs.") => {
                let (name, element) = reservoir_key(key)?;
                config
                    .reservoirs
                    .get_or_insert_with(Default::default)
                    .entry(name.to_string())
                    .or_insert_with(ChemicalPotentials::new)
                    .insert(element, float()?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

/// Splits `reservoirs.<name>.<El>`; the name may itself contain dots.
fn reservoir_key(key: &str) -> Result<(&str, Element)> {
    let invalid = || {
        CliError::Config(format!(
            "Invalid reservoir key '{}'. Expected 'reservoirs.<name>.<El>'.",
            key
        ))
    };
    let rest = key.strip_prefix("reservoirs.").ok_or_else(invalid)?;
    let (name, symbol) = rest.rsplit_once('.').ok_or_else(invalid)?;
    if name.is_empty() {
        return Err(invalid());
    }
    let element = symbol
        .parse::<Element>()
        .map_err(|e| CliError::Config(format!("{} in key '{}'", e, key)))?;
    Ok((name, element))
}
