use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use dimer_graph::{aztec_diamond, hexagon, rectangle, square_annulus};

use super::emit_json;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(subcommand)]
    pub shape: Shape,
    /// Output file; stdout when omitted.
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Shape {
    /// Rectangle of unit squares.
    Rectangle {
        #[arg(long)]
        width: i32,
        #[arg(long)]
        height: i32,
    },
    /// Aztec diamond of the given order.
    Aztec {
        #[arg(long)]
        order: i32,
    },
    /// Regular hexagon on the triangular lattice.
    Hexagon {
        #[arg(long)]
        side: i32,
    },
    /// Square with a centred square hole.
    Annulus {
        #[arg(long)]
        outer: i32,
        #[arg(long)]
        inner: i32,
    },
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let spec = match args.shape {
        Shape::Rectangle { width, height } => rectangle(width, height),
        Shape::Aztec { order } => aztec_diamond(order),
        Shape::Hexagon { side } => hexagon(side),
        Shape::Annulus { outer, inner } => {
            if inner >= outer {
                return Err("annulus hole must be smaller than the square".into());
            }
            square_annulus(outer, inner)
        }
    };
    emit_json(args.out.as_deref(), &spec)
}
