// tukangin/src/model/professional.rs

use super::ProfessionalId;
use serde::{Deserialize, Serialize};

/// Display information for a tukang, as shown next to a warranty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Professional {
  pub id: ProfessionalId,
  pub name: String,
  pub phone: Option<String>,
  pub specialty: Option<String>,
}
