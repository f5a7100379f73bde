use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};

use pakfs_pak::testing::PakBuilder;
use pakfs_pak::{MetadataValue, PakArchive};
use pretty_assertions::assert_eq;

/// A cursor that records every absolute seek.
struct SeekLog {
    inner: Cursor<Vec<u8>>,
    seeks: Arc<Mutex<Vec<u64>>>,
}

impl Read for SeekLog {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for SeekLog {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let result = self.inner.seek(pos)?;
        self.seeks.lock().unwrap().push(result);
        Ok(result)
    }
}

fn sample_archive() -> Vec<u8> {
    PakBuilder::new()
        .metadata("name", "Sample")
        .metadata("priority", -10i64)
        .metadata("includes", vec!["base".to_string()])
        // 16-byte header + 84 bytes of padding puts the next item at 100.
        .file("/padding.bin", vec![0xAA; 84])
        .file("/data/fifty.bin", (0u8..50).collect())
        .build()
}

#[test]
fn read_item_is_one_seek_and_one_read() {
    let seeks = Arc::new(Mutex::new(Vec::new()));
    let stream = SeekLog {
        inner: Cursor::new(sample_archive()),
        seeks: Arc::clone(&seeks),
    };
    let archive = PakArchive::from_reader(stream).unwrap();
    seeks.lock().unwrap().clear();

    let item = archive.find("/data/fifty.bin").unwrap();
    assert_eq!(item.offset(), 100);
    assert_eq!(item.length(), 50);

    let data = archive.read_item(item).unwrap();
    assert_eq!(data.len(), 50);
    assert_eq!(data, (0u8..50).collect::<Vec<_>>());
    assert_eq!(*seeks.lock().unwrap(), [100]);
}

#[test]
fn declared_length_past_end_is_truncation() {
    let mut data = sample_archive();
    let archive = PakArchive::from_reader(Cursor::new(data.clone())).unwrap();
    let end = data.len() as u64;
    let item = pakfs_pak::PakItem::new("/ghost.bin", end - 10, 50);
    let err = archive.read_item(&item).unwrap_err();
    assert!(err.is_truncated(), "{err}");

    data.truncate(data.len() - 1);
    let err = PakArchive::from_reader(Cursor::new(data)).unwrap_err();
    assert!(err.is_truncated(), "{err}");
}

#[test]
fn corrupt_index_tag_fails_to_open() {
    let data = PakBuilder::new()
        .index_tag(*b"INDEZ")
        .file("/a.txt", b"a".to_vec())
        .build();
    let err = PakArchive::from_reader(Cursor::new(data)).unwrap_err();
    assert!(err.is_invalid_format(), "{err}");
}

#[test]
fn open_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&sample_archive()).unwrap();
    file.flush().unwrap();

    let buffered = PakArchive::open(file.path()).unwrap();
    let mapped = PakArchive::open_mapped(file.path()).unwrap();

    for items in [buffered.items(), mapped.items()] {
        let paths: Vec<_> = items.iter().map(|i| i.path()).collect();
        assert_eq!(paths, ["/padding.bin", "/data/fifty.bin"]);
    }

    assert_eq!(
        buffered.metadata().get("priority"),
        Some(&MetadataValue::Integer(-10))
    );
    assert_eq!(buffered.metadata(), mapped.metadata());

    let item = mapped.find("/padding.bin").unwrap();
    assert_eq!(mapped.read_item(item).unwrap(), vec![0xAA; 84]);
}

#[test]
fn open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = PakArchive::open(dir.path().join("missing.pak")).unwrap_err();
    assert!(matches!(err, pakfs_pak::Error::Io(_)));
}

#[test]
fn concurrent_reads_share_one_stream() {
    let payloads: Vec<(String, Vec<u8>)> = (0u8..8)
        .map(|i| {
            let len = 64 + usize::from(i) * 37;
            let data = (0..len).map(|j| (j as u8).wrapping_mul(31).wrapping_add(i)).collect();
            (format!("/blob/{i}.bin"), data)
        })
        .collect();

    let builder = payloads
        .iter()
        .fold(PakBuilder::new(), |b, (path, data)| b.file(path, data.clone()));
    let archive = PakArchive::from_reader(Cursor::new(builder.build())).unwrap();

    std::thread::scope(|scope| {
        for worker in 0..8usize {
            let archive = &archive;
            let payloads = &payloads;
            scope.spawn(move || {
                for round in 0..200usize {
                    let (path, expected) = &payloads[(worker + round) % payloads.len()];
                    let item = archive.find(path).unwrap();

                    assert_eq!(&archive.read_item(item).unwrap(), expected);

                    let offset = round % 32;
                    let mut slice = vec![0u8; 16];
                    archive
                        .read_item_range(item, offset as u64, &mut slice)
                        .unwrap();
                    assert_eq!(slice, &expected[offset..offset + 16]);
                }
            });
        }
    });
}
