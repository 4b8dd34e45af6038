//! Command-line grammar for scripts, `exec` and the shell.
//!
//! A command is one whitespace-separated line. The first token names the
//! operation (case-insensitive), the rest are positional arguments. Optional
//! mask names sit between the source and the destination, so they are
//! recognised by argument count.

use anyhow::{Context, Result, bail};
use rgbkit_ops::{Component, FlipDirection, MaskedOp, SplitOp};
use std::path::PathBuf;

/// One parsed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `load <path> <name>`
    Load { path: PathBuf, name: String },
    /// `save <path> <name>`
    Save { path: PathBuf, name: String },
    /// `<component>-component <src> [mask] <dst>`
    Component {
        kind: Component,
        src: String,
        mask: Option<String>,
        dst: String,
    },
    /// `flip <direction> <src> <dst>`, `horizontal-flip <src> <dst>`, `vertical-flip <src> <dst>`
    Flip {
        direction: FlipDirection,
        src: String,
        dst: String,
    },
    /// `brighten <amount> <src> <dst>`
    Brighten { amount: i32, src: String, dst: String },
    /// `blur|sharpen|sepia <src> [mask] <dst>`
    Filter {
        op: MaskedOp,
        src: String,
        mask: Option<String>,
        dst: String,
    },
    /// `greyscale [component] <src> [mask] <dst>`
    Greyscale {
        component: Option<Component>,
        src: String,
        mask: Option<String>,
        dst: String,
    },
    /// `rgb-split <src> <red> <green> <blue>`
    RgbSplit { src: String, dst: [String; 3] },
    /// `rgb-combine <dst> <red> <green> <blue>`
    RgbCombine { dst: String, src: [String; 3] },
    /// `histogram <src> <dst>`
    Histogram { src: String, dst: String },
    /// `color-correct <src> <dst>`
    ColorCorrect { src: String, dst: String },
    /// `levels-adjust <black> <mid> <white> <src> <dst>`
    LevelsAdjust {
        black: i32,
        mid: i32,
        white: i32,
        src: String,
        dst: String,
    },
    /// `split <op> <src> <dst> <percent> [black mid white]`
    Split {
        op: SplitOp,
        src: String,
        dst: String,
        percent: i32,
    },
    /// `compress <percent> <src> <dst>`
    Compress { percent: f64, src: String, dst: String },
    /// `downscale <width> <height> <src> <dst>`
    Downscale {
        width: i32,
        height: i32,
        src: String,
        dst: String,
    },
    /// `run <script>`
    Run { path: PathBuf },
}

/// Positional arguments of one command.
struct Args<'a> {
    op: &'a str,
    tokens: &'a [&'a str],
}

impl<'a> Args<'a> {
    /// Checks the argument count against `min..=max`.
    fn expect(&self, min: usize, max: usize, usage: &str) -> Result<()> {
        let n = self.tokens.len();
        if n < min || n > max {
            bail!("{}: expected {usage}", self.op);
        }
        Ok(())
    }

    fn name(&self, i: usize) -> String {
        self.tokens[i].to_string()
    }

    fn int(&self, i: usize, what: &str) -> Result<i32> {
        let token = self.tokens[i];
        token
            .parse()
            .with_context(|| format!("{}: {what} must be an integer, got {token:?}", self.op))
    }

    fn number(&self, i: usize, what: &str) -> Result<f64> {
        let token = self.tokens[i];
        token
            .parse()
            .with_context(|| format!("{}: {what} must be a number, got {token:?}", self.op))
    }

    /// `<src> <dst>` or `<src> <mask> <dst>` starting at `i`.
    fn src_mask_dst(&self, i: usize) -> (String, Option<String>, String) {
        match self.tokens.len() - i {
            3 => (self.name(i), Some(self.name(i + 1)), self.name(i + 2)),
            _ => (self.name(i), None, self.name(i + 1)),
        }
    }
}

impl Command {
    /// Parses one line.
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let op = tokens[0].to_ascii_lowercase();
        let args = Args {
            op: &op,
            tokens: &tokens[1..],
        };
        Self::parse_args(&args).map(Some)
    }

    fn parse_args(a: &Args<'_>) -> Result<Self> {
        let cmd = match a.op {
            "load" => {
                a.expect(2, 2, "<path> <name>")?;
                Command::Load {
                    path: PathBuf::from(a.tokens[0]),
                    name: a.name(1),
                }
            }
            "save" => {
                a.expect(2, 2, "<path> <name>")?;
                Command::Save {
                    path: PathBuf::from(a.tokens[0]),
                    name: a.name(1),
                }
            }
            "red-component" | "green-component" | "blue-component" | "value-component"
            | "intensity-component" | "luma-component" => {
                a.expect(2, 3, "<src> [mask] <dst>")?;
                let kind: Component = a.op.parse()?;
                let (src, mask, dst) = a.src_mask_dst(0);
                Command::Component {
                    kind,
                    src,
                    mask,
                    dst,
                }
            }
            "flip" => {
                a.expect(3, 3, "<horizontal|vertical> <src> <dst>")?;
                Command::Flip {
                    direction: a.tokens[0].parse()?,
                    src: a.name(1),
                    dst: a.name(2),
                }
            }
            "horizontal-flip" | "vertical-flip" => {
                a.expect(2, 2, "<src> <dst>")?;
                let direction = if a.op == "horizontal-flip" {
                    FlipDirection::Horizontal
                } else {
                    FlipDirection::Vertical
                };
                Command::Flip {
                    direction,
                    src: a.name(0),
                    dst: a.name(1),
                }
            }
            "brighten" => {
                a.expect(3, 3, "<amount> <src> <dst>")?;
                Command::Brighten {
                    amount: a.int(0, "amount")?,
                    src: a.name(1),
                    dst: a.name(2),
                }
            }
            "blur" | "sharpen" | "sepia" => {
                a.expect(2, 3, "<src> [mask] <dst>")?;
                let op = match a.op {
                    "blur" => MaskedOp::Blur,
                    "sharpen" => MaskedOp::Sharpen,
                    _ => MaskedOp::Sepia,
                };
                let (src, mask, dst) = a.src_mask_dst(0);
                Command::Filter { op, src, mask, dst }
            }
            "greyscale" => {
                a.expect(2, 4, "[component] <src> [mask] <dst>")?;
                // A leading component keyword is taken as the component
                let component = match a.tokens.len() {
                    2 => None,
                    _ => a.tokens[0].parse::<Component>().ok(),
                };
                let start = usize::from(component.is_some());
                if a.tokens.len() - start > 3 || a.tokens.len() - start < 2 {
                    bail!("{}: expected [component] <src> [mask] <dst>", a.op);
                }
                let (src, mask, dst) = a.src_mask_dst(start);
                Command::Greyscale {
                    component,
                    src,
                    mask,
                    dst,
                }
            }
            "rgb-split" => {
                a.expect(4, 4, "<src> <red> <green> <blue>")?;
                Command::RgbSplit {
                    src: a.name(0),
                    dst: [a.name(1), a.name(2), a.name(3)],
                }
            }
            "rgb-combine" => {
                a.expect(4, 4, "<dst> <red> <green> <blue>")?;
                Command::RgbCombine {
                    dst: a.name(0),
                    src: [a.name(1), a.name(2), a.name(3)],
                }
            }
            "histogram" => {
                a.expect(2, 2, "<src> <dst>")?;
                Command::Histogram {
                    src: a.name(0),
                    dst: a.name(1),
                }
            }
            "color-correct" => {
                a.expect(2, 2, "<src> <dst>")?;
                Command::ColorCorrect {
                    src: a.name(0),
                    dst: a.name(1),
                }
            }
            "levels-adjust" => {
                a.expect(5, 5, "<black> <mid> <white> <src> <dst>")?;
                Command::LevelsAdjust {
                    black: a.int(0, "black")?,
                    mid: a.int(1, "mid")?,
                    white: a.int(2, "white")?,
                    src: a.name(3),
                    dst: a.name(4),
                }
            }
            "split" => {
                a.expect(4, 7, "<op> <src> <dst> <percent> [black mid white]")?;
                let percent = a.int(3, "split percentage")?;
                let params = (4..a.tokens.len())
                    .map(|i| a.int(i, "levels value"))
                    .collect::<Result<Vec<_>>>()?;
                Command::Split {
                    op: SplitOp::parse(a.tokens[0], &params)?,
                    src: a.name(1),
                    dst: a.name(2),
                    percent,
                }
            }
            "compress" => {
                a.expect(3, 3, "<percent> <src> <dst>")?;
                Command::Compress {
                    percent: a.number(0, "percentage")?,
                    src: a.name(1),
                    dst: a.name(2),
                }
            }
            "downscale" => {
                a.expect(4, 4, "<width> <height> <src> <dst>")?;
                Command::Downscale {
                    width: a.int(0, "width")?,
                    height: a.int(1, "height")?,
                    src: a.name(2),
                    dst: a.name(3),
                }
            }
            "run" => {
                a.expect(1, 1, "<script>")?;
                Command::Run {
                    path: PathBuf::from(a.tokens[0]),
                }
            }
            other => bail!("unknown command: {other}"),
        };
        Ok(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    fn parse_err(line: &str) -> String {
        format!("{:#}", Command::parse(line).unwrap_err())
    }

    #[test]
    fn test_skips_blank_and_comments() {
        assert!(Command::parse("").unwrap().is_none());
        assert!(Command::parse("   ").unwrap().is_none());
        assert!(Command::parse("# load a b").unwrap().is_none());
    }

    #[test]
    fn test_load_save() {
        assert_eq!(
            parse("load images/koala.ppm koala"),
            Command::Load {
                path: "images/koala.ppm".into(),
                name: "koala".into()
            }
        );
        assert!(matches!(parse("SAVE out.png koala"), Command::Save { .. }));
    }

    #[test]
    fn test_components_with_mask() {
        assert_eq!(
            parse("luma-component src mask dst"),
            Command::Component {
                kind: Component::Luma,
                src: "src".into(),
                mask: Some("mask".into()),
                dst: "dst".into()
            }
        );
        assert!(matches!(
            parse("red-component a b"),
            Command::Component { kind: Component::Red, mask: None, .. }
        ));
    }

    #[test]
    fn test_flip_forms() {
        let expected = Command::Flip {
            direction: FlipDirection::Vertical,
            src: "a".into(),
            dst: "b".into(),
        };
        assert_eq!(parse("flip vertical a b"), expected);
        assert_eq!(parse("vertical-flip a b"), expected);
        assert!(parse_err("flip sideways a b").contains("invalid flip direction"));
    }

    #[test]
    fn test_greyscale_forms() {
        assert!(matches!(
            parse("greyscale a b"),
            Command::Greyscale { component: None, mask: None, .. }
        ));
        assert!(matches!(
            parse("greyscale luma a b"),
            Command::Greyscale { component: Some(Component::Luma), mask: None, .. }
        ));
        assert!(matches!(
            parse("greyscale a m b"),
            Command::Greyscale { component: None, mask: Some(_), .. }
        ));
        assert!(matches!(
            parse("greyscale value-component a m b"),
            Command::Greyscale { component: Some(Component::Value), mask: Some(_), .. }
        ));
        assert!(Command::parse("greyscale a m b c").is_err());
    }

    #[test]
    fn test_split() {
        assert_eq!(
            parse("split blur a b 50"),
            Command::Split {
                op: SplitOp::Blur,
                src: "a".into(),
                dst: "b".into(),
                percent: 50
            }
        );
        assert!(matches!(
            parse("split levels a b 30 10 100 200"),
            Command::Split { op: SplitOp::Levels(_), percent: 30, .. }
        ));
        assert!(parse_err("split levels a b 30").contains("black, mid and white"));
        assert!(parse_err("split blur a b half").contains("integer"));
        assert!(parse_err("split blur a b 50 1 2 3").contains("takes no extra values"));
    }

    #[test]
    fn test_numeric_args() {
        assert!(matches!(parse("brighten -30 a b"), Command::Brighten { amount: -30, .. }));
        assert!(matches!(
            parse("compress 12.5 a b"),
            Command::Compress { percent, .. } if percent == 12.5
        ));
        assert!(parse_err("brighten lots a b").contains("amount must be an integer"));
        assert!(matches!(
            parse("downscale 10 20 a b"),
            Command::Downscale { width: 10, height: 20, .. }
        ));
    }

    #[test]
    fn test_errors_are_reported() {
        assert!(parse_err("frobnicate a b").contains("unknown command: frobnicate"));
        assert!(parse_err("load onlypath").contains("expected <path> <name>"));
        assert!(parse_err("rgb-split a r g").contains("rgb-split"));
        assert!(parse_err("levels-adjust 1 2 a b").contains("levels-adjust"));
    }
}
