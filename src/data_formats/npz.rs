// src/data_formats/npz.rs
//
// NPY / NPZ helpers: decode single arrays, look up named members of an
// archive, and build archives (fixtures, tooling).

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use ndarray::ArrayD;
use ndarray_npy::{ReadNpyError, ReadNpyExt, WriteNpyExt};
use std::io::{Cursor, Read, Write};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipArchive, ZipWriter};

const NPY_SUFFIX: &str = ".npy";

/// Decode one `.npy` payload as `f32`.
///
/// Arrays stored as `f64` (numpy's default float) are narrowed; any other
/// descriptor is an error.
pub fn read_npy_bytes(data: &[u8]) -> Result<ArrayD<f32>, ReadNpyError> {
    match ArrayD::<f32>::read_npy(Cursor::new(data)) {
        Err(ReadNpyError::WrongDescriptor(_)) => {
            let wide = ArrayD::<f64>::read_npy(Cursor::new(data))?;
            Ok(wide.mapv(|v| v as f32))
        }
        other => other,
    }
}

/// Serialize an `f32` array as a complete `.npy` payload.
pub fn array_to_npy_bytes(array: &ArrayD<f32>) -> Result<Bytes> {
    let mut buf = Vec::new();
    array.write_npy(&mut buf)?;
    Ok(Bytes::from(buf))
}

/// Names of the arrays stored in an `.npz` archive, `.npy` suffix stripped.
pub fn list_npz_arrays(npz: &[u8]) -> Result<Vec<String>> {
    let zip = ZipArchive::new(Cursor::new(npz)).context("Not a valid npz archive")?;
    Ok(zip
        .file_names()
        .map(|n| n.strip_suffix(NPY_SUFFIX).unwrap_or(n).to_string())
        .collect())
}

/// Read the member `name` of an `.npz` archive as `f32`.
///
/// `name` may be given with or without the `.npy` suffix numpy adds on save.
/// Returns `Ok(None)` when the archive has no such member.
pub fn find_npz_array(npz: &[u8], name: &str) -> Result<Option<ArrayD<f32>>> {
    let mut zip = ZipArchive::new(Cursor::new(npz)).context("Not a valid npz archive")?;
    let stem = name.strip_suffix(NPY_SUFFIX).unwrap_or(name);
    let with_suffix = format!("{stem}{NPY_SUFFIX}");

    let member = [with_suffix.as_str(), stem]
        .into_iter()
        .find(|candidate| zip.index_for_name(candidate).is_some());
    let Some(member) = member else {
        return Ok(None);
    };

    let mut entry = zip.by_name(member)?;
    let mut raw = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut raw)?;
    let array = read_npy_bytes(&raw).with_context(|| format!("Failed to decode npz member {member}"))?;
    Ok(Some(array))
}

/// Like [`find_npz_array`] but a missing member is an error.
pub fn read_npz_array(npz: &[u8], name: &str) -> Result<ArrayD<f32>> {
    match find_npz_array(npz, name)? {
        Some(array) => Ok(array),
        None => bail!("npz archive has no array named {name}"),
    }
}

/// Build an **entire** multi-array .npz archive in memory and return it.
///
/// Members are stored uncompressed, as `numpy.savez` does. A `.npy` suffix
/// on a name is not duplicated.
pub fn build_multi_npz<'a, I>(arrays: I) -> Result<Bytes>
where
    I: IntoIterator<Item = (&'a str, &'a ArrayD<f32>)>,
{
    let mut cursor = Cursor::new(Vec::<u8>::new());
    let mut written = 0usize;
    {
        let mut zip = ZipWriter::new(&mut cursor);
        let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        for (name, array) in arrays {
            let stem = name.strip_suffix(NPY_SUFFIX).unwrap_or(name);
            zip.start_file(format!("{stem}{NPY_SUFFIX}"), opts)?;
            let npy = array_to_npy_bytes(array)?;
            zip.write_all(&npy)?;
            written += 1;
        }
        if written == 0 {
            bail!("Cannot build an npz archive from zero arrays");
        }
        zip.finish()?;
    } // <- ZipWriter dropped, borrow ends

    Ok(Bytes::from(cursor.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};

    #[test]
    fn npy_roundtrip_keeps_shape() {
        let a = arr2(&[[1.0f32, 2.0], [3.0, 4.0]]).into_dyn();
        let bytes = array_to_npy_bytes(&a).unwrap();
        assert_eq!(&bytes[0..6], b"\x93NUMPY");
        let back = read_npy_bytes(&bytes).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn f64_payload_is_narrowed() {
        let wide: Array2<f64> = arr2(&[[0.5, 1.5], [2.5, 1e10]]);
        let mut buf = Vec::new();
        wide.write_npy(&mut buf).unwrap();

        let narrow = read_npy_bytes(&buf).unwrap();
        assert_eq!(narrow.shape(), &[2, 2]);
        assert_eq!(narrow[[0, 1]], 1.5f32);
        assert_eq!(narrow[[1, 1]], 1e10f32);
    }

    #[test]
    fn integer_payload_is_rejected() {
        let ints: Array2<i32> = arr2(&[[1, 2]]);
        let mut buf = Vec::new();
        ints.write_npy(&mut buf).unwrap();
        assert!(read_npy_bytes(&buf).is_err());
    }

    #[test]
    fn lookup_with_and_without_suffix() {
        let k = arr2(&[[500.0f32, 0.0, 320.0], [0.0, 500.0, 240.0], [0.0, 0.0, 1.0]]).into_dyn();
        let npz = build_multi_npz([("intrinsics", &k)]).unwrap();

        assert_eq!(list_npz_arrays(&npz).unwrap(), vec!["intrinsics".to_string()]);
        assert_eq!(read_npz_array(&npz, "intrinsics").unwrap(), k);
        assert_eq!(read_npz_array(&npz, "intrinsics.npy").unwrap(), k);
        assert!(find_npz_array(&npz, "pose").unwrap().is_none());
        assert!(read_npz_array(&npz, "pose").is_err());
    }

    #[test]
    fn garbage_is_not_an_archive() {
        assert!(list_npz_arrays(b"definitely not a zip").is_err());
    }
}
