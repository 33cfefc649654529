//! `check-container`: reference hygiene checks for a container image

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use anyhow::{Context, bail};
use regex::Regex;

use crate::config::Config;
use crate::context::{ExecutionContext, InvocationWatch};
use crate::plugin::{CheckOutcome, Disposition, Plugin, PluginFlag, ResultSet};

/// Registered name of the plugin
pub const NAME: &str = "check-container";

const ALLOW_LATEST: &str = "allow-latest";

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<registry>[a-zA-Z0-9.-]+(?::[0-9]+)?)/)?(?P<path>[a-z0-9]+(?:[._-][a-z0-9]+)*(?:/[a-z0-9]+(?:[._-][a-z0-9]+)*)*)(?::(?P<tag>\w[\w.-]{0,127}))?(?:@(?P<digest>sha256:[a-f0-9]{64}))?$",
    )
    .expect("image reference pattern is valid")
});

/// Parsed parts of an image reference
#[derive(Debug, Clone, PartialEq, Eq)]
struct ImageReference {
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageReference {
    fn parse(reference: &str) -> Option<Self> {
        let caps = REFERENCE.captures(reference)?;
        Some(Self {
            tag: caps.name("tag").map(|m| m.as_str().to_string()),
            digest: caps.name("digest").map(|m| m.as_str().to_string()),
        })
    }
}

/// State of one invocation of the plugin
#[derive(Debug)]
struct Run {
    watch: InvocationWatch,
    image: String,
    allow_latest: bool,
    results: ResultSet,
}

/// Checks that an image reference is well formed and pinned
///
/// The plugin is shared through the registry, so each invocation keeps its
/// own state keyed by [`InvocationId`](crate::context::InvocationId). State of
/// finished invocations is dropped on the next `init`.
#[derive(Debug, Default)]
pub struct ContainerPlugin {
    runs: Mutex<HashMap<u64, Run>>,
}

impl ContainerPlugin {
    /// Create the plugin
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn runs(&self) -> MutexGuard<'_, HashMap<u64, Run>> {
        self.runs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.runs().len()
    }
}

impl Plugin for ContainerPlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &str {
        "Check a container image reference"
    }

    fn flags(&self) -> Vec<PluginFlag> {
        vec![PluginFlag::bool(ALLOW_LATEST, "Do not fail images tagged latest (env: PFLT_ALLOW_LATEST)")
            .with_default("false")]
    }

    fn init(&self, ctx: &ExecutionContext, config: &mut Config, args: &[String]) -> anyhow::Result<()> {
        let Some(image) = args.first() else {
            bail!("an image reference is required");
        };
        let mut runs = self.runs();
        runs.retain(|_, run| run.watch.is_live());
        runs.insert(
            ctx.invocation().get(),
            Run {
                watch: ctx.invocation().watch(),
                image: image.clone(),
                allow_latest: config.get_bool(ALLOW_LATEST),
                results: ResultSet::new(),
            },
        );
        ctx.logger().debug("target image", &[("image", image)]);
        Ok(())
    }

    fn execute_checks(&self, ctx: &ExecutionContext) -> anyhow::Result<()> {
        let mut runs = self.runs();
        let run = runs
            .get_mut(&ctx.invocation().get())
            .context("plugin was not initialized")?;

        let start = Instant::now();
        let parsed = ImageReference::parse(&run.image);
        let valid = if parsed.is_some() {
            Disposition::Passed
        } else {
            Disposition::Failed
        };
        run.results.record(valid, CheckOutcome::new("ValidImageReference", start.elapsed()));

        let Some(reference) = parsed else {
            ctx.logger().warn("image reference is malformed", &[("image", &run.image)]);
            for name in ["PinnedReference", "NoLatestTag"] {
                run.results.record(Disposition::Errored, CheckOutcome::new(name, start.elapsed()));
            }
            return Ok(());
        };

        let start = Instant::now();
        let pinned = if reference.tag.is_some() || reference.digest.is_some() {
            Disposition::Passed
        } else {
            Disposition::Failed
        };
        run.results.record(pinned, CheckOutcome::new("PinnedReference", start.elapsed()));

        let start = Instant::now();
        let latest = reference.digest.is_none() && reference.tag.as_deref().is_none_or(|tag| tag == "latest");
        let no_latest = if latest && !run.allow_latest {
            Disposition::Failed
        } else {
            Disposition::Passed
        };
        run.results.record(no_latest, CheckOutcome::new("NoLatestTag", start.elapsed()));

        Ok(())
    }

    fn results(&self, ctx: &ExecutionContext) -> ResultSet {
        self.runs()
            .get(&ctx.invocation().get())
            .map(|run| run.results.clone())
            .unwrap_or_default()
    }

    fn submit(&self, ctx: &ExecutionContext) -> anyhow::Result<()> {
        let payload = {
            let runs = self.runs();
            let run = runs
                .get(&ctx.invocation().get())
                .context("plugin was not initialized")?;
            serde_json::json!({
                "image": run.image,
                "results": run.results,
            })
        };
        let body = serde_json::to_vec_pretty(&payload)?;
        let path = ctx.artifacts().write_file("submission.json", &mut body.as_slice())?;
        ctx.logger().info("submission recorded", &[("path", &path.display())]);
        Ok(())
    }
}
