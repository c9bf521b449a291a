//! The fixed set of products this tool downloads.

/// A (dataset, layer) pair naming one environmental variable on the server,
/// together with the directory its per-site files are written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    SoilMoistureIndex,
    SoilWater,
    Evapotranspiration,
}

impl Product {
    pub const ALL: [Product; 3] = [
        Product::SoilMoistureIndex,
        Product::SoilWater,
        Product::Evapotranspiration,
    ];

    pub fn dataset(self) -> &'static str {
        match self {
            Product::SoilMoistureIndex | Product::SoilWater => "smips",
            Product::Evapotranspiration => "aet",
        }
    }

    pub fn layer(self) -> &'static str {
        match self {
            Product::SoilMoistureIndex => "SMindex",
            Product::SoilWater => "totalbucket",
            Product::Evapotranspiration => "ETa",
        }
    }

    /// The `datasetId` input the server expects, `<dataset>:<layer>`.
    pub fn dataset_id(self) -> String {
        format!("{}:{}", self.dataset(), self.layer())
    }

    pub fn out_dir(self) -> &'static str {
        match self {
            Product::SoilMoistureIndex => "out-index",
            Product::SoilWater => "out-sw",
            Product::Evapotranspiration => "out-et",
        }
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_dataset_id() {
        assert_eq!(Product::SoilMoistureIndex.dataset_id(), "smips:SMindex");
        assert_eq!(Product::SoilWater.dataset_id(), "smips:totalbucket");
        assert_eq!(Product::Evapotranspiration.dataset_id(), "aet:ETa");
    }

    #[test]
    fn should_use_a_distinct_directory_per_product() {
        let mut dirs: Vec<&str> = Product::ALL.iter().map(|p| p.out_dir()).collect();
        dirs.sort();
        dirs.dedup();

        assert_eq!(dirs.len(), Product::ALL.len());
    }
}
