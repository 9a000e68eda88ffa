//! cp command - Server-side copy of one object
//!
//! Both ends must use the same profile. The destination key defaults to the
//! source key; a destination ending in '/' places the source's base name under it.

use clap::Args;
use cs_core::{Error, RemotePath, object_ops};
use serde::Serialize;

use super::{fail, open_store};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Copy one object
#[derive(Args, Debug)]
pub struct CpArgs {
    /// Source object (profile/bucket/key)
    pub source: String,

    /// Destination (profile/bucket[/key])
    pub target: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CopyOutput {
    pub status: &'static str,
    pub source: String,
    pub target: String,
}

/// Parse a source object and a destination sharing its profile
pub(crate) fn parse_copy_ends(source: &str, target: &str) -> cs_core::Result<(RemotePath, RemotePath)> {
    let source = RemotePath::parse_object(source)?;
    let target = RemotePath::parse(target)?;
    if source.profile != target.profile {
        return Err(Error::InvalidArgument(format!(
            "server-side copy needs one profile ('{}' vs '{}'); use get and put instead",
            source.profile, target.profile
        )));
    }
    Ok((source, target))
}

/// Execute the cp command
pub async fn execute(args: CpArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (source, target) = match parse_copy_ends(&args.source, &args.target) {
        Ok(ends) => ends,
        Err(e) => return fail(&formatter, "Invalid arguments", &e),
    };

    let (_, store) = match open_store(&source.profile, &formatter).await {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    match object_ops::copy(
        store.as_ref(),
        &source.bucket,
        &source.key,
        &target.bucket,
        target.prefix(),
    )
    .await
    {
        Ok(key) => {
            let written = RemotePath::new(&target.profile, &target.bucket, key.as_str());
            if formatter.is_json() {
                formatter.json(&CopyOutput {
                    status: "success",
                    source: source.to_full_path(),
                    target: written.to_full_path(),
                });
            } else {
                formatter.success(&format!("{source} -> {written}"));
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Copy failed", &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_copy_ends() {
        let (source, target) = parse_copy_ends("aws/a/x/report.csv", "aws/b/").unwrap();
        assert_eq!(source.key, "x/report.csv");
        assert_eq!(target.bucket, "b");
        assert!(target.prefix().is_none());
    }

    #[test]
    fn test_parse_copy_ends_needs_object_source() {
        assert!(parse_copy_ends("aws/a", "aws/b").is_err());
    }

    #[test]
    fn test_parse_copy_ends_cross_profile() {
        let err = parse_copy_ends("aws/a/k", "gcp/b/k").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
