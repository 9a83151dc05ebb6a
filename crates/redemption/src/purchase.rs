//! Redemption purchase workflow constants.

/// The workflow type identifier for a redemption purchase.
pub const WORKFLOW_TYPE: &str = "RedemptionPurchase";

/// Step name: reserve one unit of product stock.
pub const STEP_RESERVE_STOCK: &str = "reserve_stock";

/// Step name: charge the user's wallet.
pub const STEP_CHARGE_WALLET: &str = "charge_wallet";
