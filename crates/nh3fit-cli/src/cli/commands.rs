//! JSON request and response handling for the CLI commands.

use anyhow::{Context, Result};
use nh3fit_core::fit::{ExpansionReport, ParameterSetSpec, annotations, fit_multi_component};
use nh3fit_core::physics::{OpticalDepthMap, line_center_optical_depths, synthesize};
use nh3fit_core::{PhysicalParameters, SpectralAxis};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct SynthesizeRequest {
    axis: SpectralAxis,
    #[serde(default)]
    parameters: PhysicalParameters,
    #[serde(default)]
    thin: bool,
    #[serde(default)]
    return_optical_depths: bool,
}

#[derive(Debug, Serialize)]
struct SynthesizeResponse {
    spectrum: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    optical_depths: Option<OpticalDepthMap>,
}

#[derive(Debug, Deserialize)]
struct FitRequest {
    axis: SpectralAxis,
    data: Vec<f64>,
    #[serde(default)]
    errors: Option<Vec<f64>>,
    #[serde(default = "default_components")]
    components: usize,
    #[serde(default)]
    settings: ParameterSetSpec,
}

fn default_components() -> usize {
    1
}

#[derive(Debug, Serialize)]
struct FitResponse {
    labels: Vec<String>,
    values: Vec<f64>,
    errors: Vec<f64>,
    chi_square: f64,
    iterations: usize,
    expansion: ExpansionReport,
    model: Vec<f64>,
    optical_depths: Vec<OpticalDepthMap>,
    annotations: Vec<String>,
}

pub(super) fn run_synthesize(input: &Path, output: Option<&Path>) -> Result<()> {
    let request: SynthesizeRequest = read_request(input)?;
    info!(
        samples = request.axis.len(),
        thin = request.thin,
        "synthesizing spectrum"
    );

    let spectrum = synthesize(&request.axis, &request.parameters, request.thin)
        .context("spectrum synthesis failed")?;
    let optical_depths = request
        .return_optical_depths
        .then(|| line_center_optical_depths(&request.parameters, request.thin));

    write_response(
        output,
        &SynthesizeResponse {
            spectrum,
            optical_depths,
        },
    )
}

pub(super) fn run_fit(input: &Path, output: Option<&Path>) -> Result<()> {
    let request: FitRequest = read_request(input)?;
    info!(
        samples = request.axis.len(),
        components = request.components,
        "fitting spectrum"
    );

    let result = fit_multi_component(
        &request.axis,
        &request.data,
        request.errors.as_deref(),
        &request.settings,
        request.components,
    )
    .context("fit failed")?;

    info!(
        chi_square = result.chi_square,
        iterations = result.iterations,
        "fit converged"
    );

    let labels = result
        .parameters
        .parameters()
        .iter()
        .map(|info| info.slot.display_name())
        .collect();
    let annotations = annotations(result.parameters.parameters());

    write_response(
        output,
        &FitResponse {
            labels,
            values: result.values,
            errors: result.errors,
            chi_square: result.chi_square,
            iterations: result.iterations,
            expansion: result.parameters.expansion(),
            model: result.model,
            optical_depths: result.optical_depths,
            annotations,
        },
    )
}

fn read_request<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read request file '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse request file '{}'", path.display()))
}

fn write_response<T: Serialize>(output: Option<&Path>, response: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(response).context("failed to render response")?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory '{}'", parent.display())
                })?;
            }
            fs::write(path, rendered)
                .with_context(|| format!("failed to write response to '{}'", path.display()))?;
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
