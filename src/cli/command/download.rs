//! Download every product's time series for every registered site.

use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::create_percent_bar;
use crate::drill;
use crate::normalise::TimeSeries;
use crate::product::Product;
use crate::site::{self, Site};
use crate::wps::{WpsClient, WpsService};

pub async fn download(endpoint: &str, sites_path: &Path) -> Result<()> {
    let sites = site::load(sites_path)?;
    let wps = WpsClient::new(endpoint);
    let interactive = io::stdout().is_terminal();

    let saved = download_all(&wps, &sites, Path::new("."), interactive).await?;
    println!("Saved {} time series", saved);

    Ok(())
}

/// Runs the whole batch, product by product and site by site, writing one
/// csv per pair under `out_root`. The first failure aborts the run; files
/// already written stay. Returns the number of files written.
pub async fn download_all<W: WpsService>(
    wps: &W,
    sites: &[Site],
    out_root: &Path,
    interactive: bool,
) -> Result<usize> {
    let mut saved = 0;

    for product in Product::ALL {
        let out_dir = out_root.join(product.out_dir());
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("creating output directory `{}`", out_dir.display()))?;

        for site in sites {
            let table = fetch(wps, site, product, interactive).await?;

            let path = out_dir.join(format!("{}.csv", site.name));
            table
                .write_csv(&path)
                .with_context(|| format!("writing `{}`", path.display()))?;
            saved += 1;
        }
    }

    Ok(saved)
}

async fn fetch<W: WpsService>(
    wps: &W,
    site: &Site,
    product: Product,
    interactive: bool,
) -> Result<TimeSeries> {
    let label = format!("{} {}", site.name, product.dataset_id());

    if interactive {
        let bar = create_percent_bar(format!("Downloading {}", label));
        let table = drill::download_timeseries(wps, site, product, |percent| {
            bar.set_position(percent.round() as u64);
        })
        .await?;
        bar.finish();

        Ok(table)
    } else {
        println!("Downloading {}...", label);

        Ok(drill::download_timeseries(wps, site, product, |_| {}).await?)
    }
}

// -- Tests -------------------------------------------------------------------
