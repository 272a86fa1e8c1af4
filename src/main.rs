mod app;
mod data;
mod util;

use clap::{Parser, ValueEnum};

use crate::app::{CollabGraphApp, LinkVisibility, ViewOptions};
use crate::data::SizeMetric;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "network.json")]
    data: String,

    #[arg(long, value_enum, default_value_t = MetricArg::Collaborations)]
    size_metric: MetricArg,

    #[arg(long, value_enum, default_value_t = LinksArg::Always)]
    links: LinksArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MetricArg {
    Songs,
    Collaborations,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LinksArg {
    Always,
    OnFocus,
}

impl From<MetricArg> for SizeMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Songs => SizeMetric::Songs,
            MetricArg::Collaborations => SizeMetric::Collaborations,
        }
    }
}

impl From<LinksArg> for LinkVisibility {
    fn from(arg: LinksArg) -> Self {
        match arg {
            LinksArg::Always => LinkVisibility::Always,
            LinksArg::OnFocus => LinkVisibility::OnFocus,
        }
    }
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };
    let view_options = ViewOptions {
        metric: args.size_metric.into(),
        link_visibility: args.links.into(),
    };

    eframe::run_native(
        "collab-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(CollabGraphApp::new(
                cc,
                args.data.clone(),
                view_options,
            )))
        }),
    )
}
