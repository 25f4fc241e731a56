use clap::Parser;

use crate::{api::nord_pool, prelude::*};

#[derive(Parser)]
pub struct NordPoolArgs {
    /// Delivery area, for example `NL` or `SE3`.
    #[clap(long = "nord-pool-area", env = "NORD_POOL_AREA")]
    pub area: String,

    #[clap(long = "nord-pool-currency", env = "NORD_POOL_CURRENCY", default_value = "EUR")]
    pub currency: String,
}

impl NordPoolArgs {
    pub fn api(&self) -> Result<nord_pool::Api> {
        nord_pool::Api::new(self.area.clone(), self.currency.clone())
    }
}
