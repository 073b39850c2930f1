//! Human-readable error descriptions and structured JSON error formatting.

use oildrop_core::error::{AnalysisError, BuildError};

/// Stable name for an error kind, used as the JSON `reason`.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(ae) = err.downcast_ref::<AnalysisError>() {
        return match ae {
            AnalysisError::InsufficientData { .. } => "InsufficientData",
            AnalysisError::NoSegments { .. } => "NoSegments",
            AnalysisError::InvalidVelocity { .. } => "InvalidVelocity",
            AnalysisError::InvalidConstants(_) => "InvalidConstants",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "InvalidConfig";
    }
    "Error"
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingConstants => {
                "What happened: No physical constants were provided to the analyzer.\nLikely causes: The analyzer was built without a config.\nHow to fix: Pass constants via with_constants(...) or with_config(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML or on the command line.\nHow to fix: Edit the config file or the override flags, then rerun."
            ),
        };
    }

    if let Some(ae) = err.downcast_ref::<AnalysisError>() {
        return match ae {
            AnalysisError::InsufficientData { len } => format!(
                "What happened: The position series has {len} sample(s); at least 2 are needed.\nLikely causes: Empty annotation directory or a tracker that lost the droplet.\nHow to fix: Check the input path and that the capture actually contains frames."
            ),
            AnalysisError::NoSegments { points } => format!(
                "What happened: Only {points} extremum found, so no fall or rise segment exists.\nLikely causes: Capture too short relative to segmentation.min_separation, or min_prominence too high.\nHow to fix: Record at least one full fall and rise, or lower --min-separation / --min-prominence."
            ),
            AnalysisError::InvalidVelocity { name, value } => format!(
                "What happened: {name} = {value} is not a usable speed.\nLikely causes: The droplet never rose (or never fell) during the capture, or a non-positive value was passed.\nHow to fix: Capture both directions of motion, or pass positive --v-rise / --v-fall values."
            ),
            AnalysisError::InvalidConstants(msg) => format!(
                "What happened: The physical constants are unusable ({msg}).\nLikely causes: Zero or negative values in [apparatus], [oil], [environment] or [camera].\nHow to fix: Fix the config file and check it with `oildrop check`."
            ),
        };
    }

    // String-based heuristics for errors coming from file loading and config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("series csv must have headers") {
        return "Invalid headers in series CSV. Expected 'frame,y_center'.".to_string();
    }

    if lower.contains("annotation line must have") {
        return format!(
            "What happened: An annotation file is malformed.\nLikely causes: The file is not in `class x_center y_center width height` format.\nHow to fix: Regenerate the annotations. Original: {msg}"
        );
    }

    if lower.contains("open annotation directory") || lower.contains("read config") {
        return format!(
            "What happened: An input path could not be read.\nLikely causes: Wrong path or missing permissions.\nHow to fix: Check the path and rerun. Original: {msg}"
        );
    }

    if lower.contains("parse config") || lower.contains(" must be ") {
        return format!(
            "What happened: Configuration is invalid.\nLikely causes: A value is missing, mistyped, or out of range.\nHow to fix: Edit the TOML config and try again. Original: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Map typed analysis errors to stable exit codes; everything else returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::InsufficientData { .. }) => 3,
        Some(AnalysisError::NoSegments { .. }) => 4,
        Some(AnalysisError::InvalidVelocity { .. }) => 5,
        Some(AnalysisError::InvalidConstants(_)) => 6,
        None => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = reason_name(err);
    let details = match err.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::InsufficientData { len }) => Some(json!({ "len": len })),
        Some(AnalysisError::NoSegments { points }) => Some(json!({ "points": points })),
        Some(AnalysisError::InvalidVelocity { name, value }) => {
            Some(json!({ "name": name, "value": value }))
        }
        _ => None,
    };

    let obj = if let Some(d) = details {
        json!({ "reason": reason, "details": d, "message": humanize(err) })
    } else {
        json!({ "reason": reason, "message": humanize(err) })
    };
    obj.to_string()
}
