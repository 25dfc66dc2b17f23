use crate::core::io::traits::StructureFile;
use crate::core::models::atom::AtomRecord;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Header declares {declared} atoms but {found} were read")]
    CountMismatch { declared: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum XyzParseErrorKind {
    #[error("Missing atom count line")]
    MissingCount,
    #[error("Invalid atom count '{0}'")]
    InvalidCount(String),
    #[error("Expected 'type x y z [tag]', found {0} field(s)")]
    TooFewFields(usize),
    #[error("Invalid {axis} coordinate '{value}'")]
    InvalidCoordinate { axis: char, value: String },
}

/// Upper bound on the pre-allocation taken from an untrusted count line.
const MAX_PREALLOCATED_ATOMS: usize = 4096;

/// Plain XYZ: an atom count, a comment line, then one `type x y z [tag]` line per atom.
pub struct XyzFile;

impl StructureFile for XyzFile {
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<AtomRecord>, Self::Error> {
        let mut lines = reader.lines();

        let count_line = lines.next().transpose()?.ok_or(XyzError::Parse {
            line: 1,
            kind: XyzParseErrorKind::MissingCount,
        })?;
        let declared: usize = count_line.trim().parse().map_err(|_| XyzError::Parse {
            line: 1,
            kind: XyzParseErrorKind::InvalidCount(count_line.trim().to_string()),
        })?;
        let _comment = lines.next().transpose()?;

        let mut atoms = Vec::with_capacity(declared.min(MAX_PREALLOCATED_ATOMS));
        for (index, line_res) in lines.enumerate() {
            let line = line_res?;
            let line_num = index + 3;
            if line.trim().is_empty() {
                continue;
            }
            if atoms.len() == declared {
                return Err(XyzError::CountMismatch {
                    declared,
                    found: atoms.len() + 1,
                });
            }
            atoms.push(parse_atom_line(&line, line_num)?);
        }

        if atoms.len() != declared {
            return Err(XyzError::CountMismatch {
                declared,
                found: atoms.len(),
            });
        }
        Ok(atoms)
    }

    fn write_to(
        atoms: &[AtomRecord],
        comment: &str,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", atoms.len())?;
        writeln!(writer, "{}", comment.replace('\n', " "))?;
        for atom in atoms {
            let p = atom.position;
            match &atom.tag {
                Some(tag) => writeln!(
                    writer,
                    "{:<4} {:>14.6} {:>14.6} {:>14.6} {}",
                    atom.atom_type, p.x, p.y, p.z, tag
                )?,
                None => writeln!(
                    writer,
                    "{:<4} {:>14.6} {:>14.6} {:>14.6}",
                    atom.atom_type, p.x, p.y, p.z
                )?,
            }
        }
        Ok(())
    }
}

fn parse_atom_line(line: &str, line_num: usize) -> Result<AtomRecord, XyzError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(XyzError::Parse {
            line: line_num,
            kind: XyzParseErrorKind::TooFewFields(fields.len()),
        });
    }

    let coordinate = |axis: char, value: &str| -> Result<f64, XyzError> {
        value.parse().map_err(|_| XyzError::Parse {
            line: line_num,
            kind: XyzParseErrorKind::InvalidCoordinate {
                axis,
                value: value.to_string(),
            },
        })
    };
    let position = Point3::new(
        coordinate('x', fields[1])?,
        coordinate('y', fields[2])?,
        coordinate('z', fields[3])?,
    );

    Ok(match fields.get(4) {
        Some(tag) => AtomRecord::with_tag(fields[0], position, tag),
        None => AtomRecord::new(fields[0], position),
    })
}
