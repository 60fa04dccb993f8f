//! The `epitaph describe` command: every prompt against every photograph.

use clap::Args;
use epitaph_core::prompts::{default_describe_columns, default_describe_prompts, IMAGE_NAME_COLUMN};
use epitaph_core::Config;
use std::path::PathBuf;
use std::time::Instant;

use super::common::{
    build_assembler, create_progress_bar, expand_path, print_summary, write_table, ApiArgs,
    OutputArgs,
};

/// Arguments for the `describe` command.
#[derive(Args, Debug, Default)]
pub struct DescribeArgs {
    /// Folder of gravestone photographs
    #[arg(required = true)]
    pub folder: PathBuf,

    /// Prompt to run against every image; repeat for several (defaults to the built-in prompts)
    #[arg(short, long = "prompt")]
    pub prompts: Vec<String>,

    /// Column name for each prompt, in prompt order (the image name column is added first)
    #[arg(short, long = "column")]
    pub columns: Vec<String>,

    #[command(flatten)]
    pub api: ApiArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Pick the prompts and full column list for a run.
///
/// Without `--prompt` the built-in prompts and their columns are used. With
/// `--prompt` but no `--column`, columns are named `Prompt 1`, `Prompt 2`, ...
/// Any other count mismatch is rejected before a single call is made.
pub fn resolve_prompts(args: &DescribeArgs) -> anyhow::Result<(Vec<String>, Vec<String>)> {
    if args.prompts.is_empty() {
        if !args.columns.is_empty() {
            anyhow::bail!("--column requires --prompt: the built-in prompts name their own columns");
        }
        return Ok((default_describe_prompts(), default_describe_columns()));
    }
    if let Some(i) = args.prompts.iter().position(|p| p.trim().is_empty()) {
        anyhow::bail!("Prompt {} is empty", i + 1);
    }

    let names: Vec<String> = if args.columns.is_empty() {
        (1..=args.prompts.len())
            .map(|i| format!("Prompt {i}"))
            .collect()
    } else if args.columns.len() == args.prompts.len() {
        args.columns.clone()
    } else {
        anyhow::bail!(
            "Got {} prompt(s) but {} column name(s); give one --column per --prompt",
            args.prompts.len(),
            args.columns.len()
        );
    };

    let columns = std::iter::once(IMAGE_NAME_COLUMN.to_string())
        .chain(names)
        .collect();
    Ok((args.prompts.clone(), columns))
}

/// Execute the describe command.
pub async fn execute(args: DescribeArgs, config: &Config) -> anyhow::Result<()> {
    let (prompts, columns) = resolve_prompts(&args)?;
    let folder = expand_path(&args.folder);

    let progress = create_progress_bar("describing...");
    let assembler = build_assembler(config, &args.api, &progress)?;

    let start = Instant::now();
    let assembly = assembler.describe_images(&folder, &prompts, &columns).await?;
    progress.finish_and_clear();

    if assembly.table.is_empty() && assembly.stats.folder_error.is_none() {
        tracing::warn!("No files found in {:?}", folder);
    }
    write_table(&assembly.table, &args.output, config)?;
    print_summary("Describe", &assembly.stats, start.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn describe_args_default_lists_are_empty() {
        let args = DescribeArgs::default();
        assert!(args.prompts.is_empty());
        assert!(args.columns.is_empty());
        assert!(args.output.output.is_none());
        assert!(args.api.model.is_none());
    }

    #[test]
    fn resolve_uses_builtin_prompts_by_default() {
        let (prompts, columns) = resolve_prompts(&DescribeArgs::default()).unwrap();
        assert_eq!(columns.len(), prompts.len() + 1);
        assert_eq!(columns[0], "Image Name");
    }

    #[test]
    fn resolve_numbers_unnamed_prompts() {
        let args = DescribeArgs {
            prompts: strings(&["material?", "symbols?"]),
            ..DescribeArgs::default()
        };
        let (_, columns) = resolve_prompts(&args).unwrap();
        assert_eq!(columns, strings(&["Image Name", "Prompt 1", "Prompt 2"]));
    }

    #[test]
    fn resolve_uses_given_columns() {
        let args = DescribeArgs {
            prompts: strings(&["material?"]),
            columns: strings(&["Material"]),
            ..DescribeArgs::default()
        };
        let (prompts, columns) = resolve_prompts(&args).unwrap();
        assert_eq!(prompts, strings(&["material?"]));
        assert_eq!(columns, strings(&["Image Name", "Material"]));
    }

    #[test]
    fn resolve_rejects_count_mismatch() {
        let args = DescribeArgs {
            prompts: strings(&["a", "b"]),
            columns: strings(&["A"]),
            ..DescribeArgs::default()
        };
        assert!(resolve_prompts(&args).is_err());

        let args = DescribeArgs {
            columns: strings(&["A"]),
            ..DescribeArgs::default()
        };
        assert!(resolve_prompts(&args).is_err());
    }

    #[test]
    fn resolve_rejects_blank_prompt() {
        let args = DescribeArgs {
            prompts: strings(&["material?", "  "]),
            ..DescribeArgs::default()
        };
        let err = resolve_prompts(&args).unwrap_err();
        assert_eq!(err.to_string(), "Prompt 2 is empty");
    }
}
