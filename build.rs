use shadow_rs::BuildPattern;
use shadow_rs::ShadowBuilder;

// Exposes build metadata as `astar::build` for `--version` and reports.
fn main() -> Result<(), shadow_rs::ShadowError> {
    ShadowBuilder::builder()
        .build_pattern(BuildPattern::Lazy)
        .deny_const(Default::default())
        .build()?;

    Ok(())
}
