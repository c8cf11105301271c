//! # tranchelock-custody
//!
//! The asset side of the ledger: how funds enter and leave custody.
//!
//! ## Architecture
//!
//! 1. **AssetTransfer**: the collaborator contract the ledger calls to pull
//!    funds in at lockup creation and push them out at claim
//! 2. **AssetBook**: an in-memory fungible asset implementing that contract,
//!    with balances, allowances, and minting
//! 3. **CustodyConservation**: tracks everything pulled into and released
//!    from custody and checks the custody balance against it
//!
//! ```text
//! create_lockup → transfer_from(user → custody) → CustodyConservation.record_pull()
//! claim_*       → transfer(custody → user)      → CustodyConservation.record_release()
//! ```

pub mod asset_book;
pub mod conservation;
pub mod transfer;

pub use asset_book::AssetBook;
pub use conservation::CustodyConservation;
pub use transfer::AssetTransfer;
