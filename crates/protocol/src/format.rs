//! Input formats, format families and remote structure databases.

use serde::{Deserialize, Serialize};

use crate::message::{LoadCommand, SceneMode};

/// File format understood by the embedded renderer.
///
/// Serialized in lowercase (`"pdb"`, `"mmcif"`, `"ccp4"`), which is the
/// spelling the renderer expects in the `format` field of load commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
	/// PDB flat file (`.pdb`, `.ent`).
	Pdb,
	/// PDBx/mmCIF (`.cif`, `.mmcif`, `.mcif`).
	Mmcif,
	/// CCP4/MRC density map (`.map`, `.mrc`, `.ccp4`).
	Ccp4,
}

impl Format {
	/// Looks up a format from a lowercase extension without the leading dot.
	pub fn from_extension(ext: &str) -> Option<Self> {
		match ext {
			"pdb" | "ent" => Some(Self::Pdb),
			"cif" | "mmcif" | "mcif" => Some(Self::Mmcif),
			"map" | "mrc" | "ccp4" => Some(Self::Ccp4),
			_ => None,
		}
	}

	/// Returns the family this format belongs to.
	pub fn family(self) -> Family {
		match self {
			Self::Pdb | Self::Mmcif => Family::Structure,
			Self::Ccp4 => Family::Volume,
		}
	}

	/// Wire spelling of the format.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Pdb => "pdb",
			Self::Mmcif => "mmcif",
			Self::Ccp4 => "ccp4",
		}
	}
}

impl std::fmt::Display for Format {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Structure vs. volume classification of an input.
///
/// The family decides which renderer verb applies; whether the load or the
/// append variant is used is decided by the caller through [`SceneMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
	/// Atomic models.
	Structure,
	/// Density maps.
	Volume,
}

impl Family {
	/// Returns the renderer verb for this family in the given scene mode.
	pub fn command(self, mode: SceneMode) -> LoadCommand {
		match (self, mode) {
			(Self::Structure, SceneMode::Replace) => LoadCommand::LoadStructure,
			(Self::Structure, SceneMode::Append) => LoadCommand::AppendStructure,
			(Self::Volume, SceneMode::Replace) => LoadCommand::LoadVolume,
			(Self::Volume, SceneMode::Append) => LoadCommand::AppendVolume,
		}
	}
}

/// Remote database an accession can be fetched from by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
	/// RCSB Protein Data Bank.
	Pdb,
	/// AlphaFold DB, addressed by UniProt accession.
	#[serde(rename = "alphafold")]
	AlphaFoldDb,
	/// Electron Microscopy Data Bank.
	Emdb,
}

impl Database {
	/// All databases in picker order.
	pub const ALL: [Database; 3] = [Database::Pdb, Database::AlphaFoldDb, Database::Emdb];

	/// Label shown in the database picker.
	pub fn label(self) -> &'static str {
		match self {
			Self::Pdb => "PDB",
			Self::AlphaFoldDb => "AlphaFoldDB (UniProt)",
			Self::Emdb => "EMDB",
		}
	}

	/// Placeholder shown when asking for an accession.
	pub fn accession_hint(self) -> &'static str {
		match self {
			Self::Pdb => "Enter a PDB accession (e.g. 1abc)",
			Self::AlphaFoldDb => "Enter a UniProt accession for AlphaFoldDB (e.g. P68871)",
			Self::Emdb => "Enter an EMDB accession (e.g. 0006)",
		}
	}

	/// Renderer verb that fetches an accession from this database.
	pub fn command(self) -> LoadCommand {
		match self {
			Self::Pdb => LoadCommand::LoadPdb,
			Self::AlphaFoldDb => LoadCommand::LoadAlphaFoldDb,
			Self::Emdb => LoadCommand::LoadEmdb,
		}
	}

	/// Format the renderer receives when it downloads an entry.
	pub fn format(self) -> Format {
		match self {
			Self::Pdb | Self::AlphaFoldDb => Format::Mmcif,
			Self::Emdb => Format::Ccp4,
		}
	}
}
