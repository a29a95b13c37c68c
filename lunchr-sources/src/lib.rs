//! Restaurant sources for lunchr.
//!
//! Every module exposes a `source()` descriptor and a `parse` routine that
//! takes the page (and where it matters, the day) explicitly.

pub mod bistroin;
mod dom;
pub mod ellas;
pub mod extract;
pub mod globus;
pub mod lafutura;
pub mod lastrada;
pub mod poklad;
pub mod trebovicky_mlyn;
pub mod u_jarosu;
pub mod u_zlateho_lva;

use lunchr_core::{SourceDescriptor, SourceRegistry};

pub use extract::{ExtractFormat, extract_text};

/// Descriptors of all bundled restaurants, in display order.
#[must_use]
pub fn sources() -> Vec<SourceDescriptor> {
    vec![
        bistroin::source(),
        u_jarosu::source(),
        u_zlateho_lva::source(),
        globus::source(),
        poklad::source(),
        trebovicky_mlyn::source(),
        lastrada::source(),
        ellas::source(),
        lafutura::source(),
    ]
}

/// Registry with every bundled restaurant.
#[must_use]
pub fn default_registry() -> SourceRegistry {
    SourceRegistry::new(sources())
}
