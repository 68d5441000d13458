//! Block traffic between accessors and pagers.

use cloudpage_access::{ElementConfig, PointCloudElement};
use cloudpage_core::{PointCloudDataRequest, ProcessingLocation};
use cloudpage_pager::{InMemoryPager, MemoryMappedPager, PagerConfig};
use cloudpage_test_utils::{
    descriptor_i32_xyz, element_with_mock, populate, populated_i32_element, set_xyz_i32,
    MockPager,
};

const BLOCK: u32 = 4;

fn config() -> ElementConfig {
    ElementConfig::new().with_block_points(BLOCK)
}

#[test]
fn one_swap_per_block_boundary() {
    let (elem, counters) = populated_i32_element(3 * BLOCK, config());
    let acc = elem.get_point_cloud_accessor(None);
    assert_eq!((counters.gets(), counters.releases()), (1, 0));

    let mut cursor = acc.cursor();
    for _ in 0..BLOCK - 1 {
        cursor.next_point();
    }
    assert_eq!((counters.gets(), counters.releases()), (1, 0));

    cursor.next_point();
    assert_eq!((counters.gets(), counters.releases()), (2, 1));
    assert_eq!(cursor.block_start(), BLOCK);

    for _ in 0..BLOCK - 1 {
        cursor.next_point();
    }
    assert_eq!((counters.gets(), counters.releases()), (2, 1));
    cursor.next_point();
    assert_eq!((counters.gets(), counters.releases()), (3, 2));
    assert_eq!(counters.outstanding(), 1);
}

#[test]
fn moves_within_a_block_never_page() {
    let (elem, counters) = populated_i32_element(3 * BLOCK, config());
    let acc = elem.get_point_cloud_accessor(None);
    let mut cursor = acc.cursor();
    cursor.to_index(BLOCK);
    counters.reset();

    cursor.to_index(BLOCK + 3);
    cursor.previous_point();
    cursor.to_index(BLOCK);
    cursor.next_point();
    assert_eq!(counters.gets(), 0);
    assert_eq!(cursor.point_id(), BLOCK + 1);
}

#[test]
fn backward_steps_reload_on_every_point() {
    let (elem, counters) = populated_i32_element(3 * BLOCK, config());
    let acc = elem.get_point_cloud_accessor(None);
    let mut cursor = acc.cursor();
    cursor.to_index(2 * BLOCK);
    counters.reset();

    for step in 1..=BLOCK {
        cursor.previous_point();
        assert_eq!(cursor.block_start(), 2 * BLOCK - step);
    }
    assert_eq!(counters.gets(), BLOCK);
    assert_eq!(counters.releases(), BLOCK);
    assert_eq!(cursor.point_id(), BLOCK);
}

#[test]
fn stepping_off_the_end_releases_then_fails() {
    let (elem, counters) = populated_i32_element(BLOCK, config());
    let acc = elem.get_point_cloud_accessor(None);
    let mut cursor = acc.cursor();
    cursor.to_index(BLOCK - 1);
    cursor.next_point();
    assert!(!cursor.is_valid());
    assert_eq!(counters.releases(), 1);
    assert_eq!(counters.failed_gets(), 1);
    assert_eq!(counters.outstanding(), 0);
}

#[test]
fn invalid_cursor_does_not_retry() {
    let (elem, counters) = populated_i32_element(BLOCK, config());
    let acc = elem.get_point_cloud_accessor(None);
    let mut cursor = acc.cursor();
    cursor.to_index(BLOCK);
    let gets = counters.gets();
    cursor.next_point();
    cursor.previous_point();
    cursor.to_index(0);
    assert!(!cursor.is_valid());
    assert_eq!(counters.gets(), gets);
}

#[test]
fn shared_cursor_released_once_by_last_handle() {
    let (elem, counters) = populated_i32_element(2 * BLOCK, config());
    let first = elem.get_point_cloud_accessor(None);
    let second = first.clone();
    assert_eq!(counters.outstanding(), 1);

    second.cursor().to_index(BLOCK);
    assert_eq!(first.cursor().point_id(), BLOCK);

    drop(first);
    assert_eq!(counters.releases(), 1);
    assert_eq!(counters.outstanding(), 1);
    assert!(second.is_valid());

    drop(second);
    assert_eq!(counters.releases(), 2);
    assert_eq!(counters.outstanding(), 0);
}

#[test]
fn independent_accessors_hold_independent_blocks() {
    let (elem, counters) = populated_i32_element(2 * BLOCK, config());
    let a = elem.get_point_cloud_accessor(None);
    let b = elem.get_point_cloud_accessor(None);
    assert_eq!(counters.outstanding(), 2);
    b.cursor().to_index(BLOCK + 2);
    assert_eq!(a.cursor().point_id(), 0);
    drop((a, b));
    assert_eq!(counters.outstanding(), 0);
}

#[test]
fn exhausted_pager_invalidates_accessor() {
    let desc = descriptor_i32_xyz(3 * BLOCK);
    let pager = MockPager::new(desc.point_size_in_bytes(), desc.array_count()).fail_after(2);
    let counters = pager.counters();
    let mut elem = PointCloudElement::new("flaky", desc, config()).unwrap();
    assert!(elem.set_pager(Box::new(pager)));

    let acc = elem.get_point_cloud_accessor(None);
    let mut cursor = acc.cursor();
    cursor.to_index(BLOCK);
    assert!(cursor.is_valid());
    cursor.to_index(2 * BLOCK);
    assert!(!cursor.is_valid());
    assert_eq!(counters.served(), 2);
    assert_eq!(counters.outstanding(), 0);
}

#[test]
fn read_only_blocks_are_not_written_back() {
    let (elem, _) = populated_i32_element(BLOCK, config());
    {
        let acc = elem.get_point_cloud_accessor(None);
        acc.cursor().set_point_id(77);
    }
    let acc = elem.get_point_cloud_accessor(None);
    assert_eq!(acc.cursor().point_id(), 0);
}

#[test]
fn in_memory_pager_backs_an_element() {
    let desc = descriptor_i32_xyz(10);
    let array_count = desc.array_count();
    let pager = InMemoryPager::initialize(&desc, array_count, &PagerConfig::new()).unwrap();
    let mut elem = PointCloudElement::new("mem", desc, config()).unwrap();
    assert!(elem.set_pager(Box::new(pager)));
    assert!(!elem.set_pager(Box::new(MockPager::new(17, 10))));

    populate(&elem, |i, cursor| {
        set_xyz_i32(cursor, [i as i32, 0, -(i as i32)]);
        cursor.set_point_valid(true);
    });
    let acc = elem.get_point_cloud_accessor(None);
    let mut cursor = acc.cursor();
    cursor.to_index(7);
    assert_eq!(cursor.z_as_integer(false), -7);
    assert!(cursor.is_point_valid());
}

#[test]
fn temp_file_element_round_trips_through_the_map() {
    let dir = tempfile::tempdir().unwrap();
    let desc = descriptor_i32_xyz(9).with_processing_location(ProcessingLocation::OnDisk);
    let mut elem = PointCloudElement::new("disk", desc, config().with_temp_dir(dir.path())).unwrap();
    elem.create_default_pager().unwrap();

    populate(&elem, |i, cursor| {
        set_xyz_i32(cursor, [0, 5 * i as i32, 0]);
        cursor.set_point_id(i);
        cursor.set_point_valid(i % 2 == 1);
    });

    let acc = elem.get_point_cloud_accessor(None);
    let mut cursor = acc.cursor();
    let mut ys = Vec::new();
    loop {
        cursor.next_valid_point();
        if !cursor.is_valid() {
            break;
        }
        ys.push(cursor.y_as_integer(false));
    }
    assert_eq!(ys, vec![5, 15, 25, 35]);
}

#[test]
fn read_only_map_serves_data_written_earlier() {
    let dir = tempfile::tempdir().unwrap();
    let desc = descriptor_i32_xyz(6);
    let point_size = desc.point_size_in_bytes();
    let path = dir.path().join("records.bin");

    {
        let mut elem = PointCloudElement::new("writer", desc.clone(), config()).unwrap();
        elem.create_in_memory_pager().unwrap();
        populate(&elem, |i, cursor| {
            cursor.set_point_id(i * 10);
            cursor.set_point_valid(true);
        });
        let acc = elem.get_point_cloud_accessor(None);
        let mut cursor = acc.cursor();
        let mut bytes = Vec::new();
        while cursor.is_valid() {
            let start = bytes.len();
            bytes.resize(start + point_size, 0);
            bytes[start + 12..start + 16].copy_from_slice(&cursor.point_id().to_ne_bytes());
            bytes[start + 16] = u8::from(cursor.is_point_valid());
            cursor.next_point();
        }
        std::fs::write(&path, bytes).unwrap();
    }

    let desc = desc.with_processing_location(ProcessingLocation::OnDiskReadOnly);
    let mut elem = PointCloudElement::new("reader", desc, config()).unwrap();
    let pager = MemoryMappedPager::initialize(&path, point_size, false, &PagerConfig::new()).unwrap();
    assert!(elem.set_pager(Box::new(pager)));

    let writable = PointCloudDataRequest::new().with_writable(true);
    assert!(!elem.get_point_cloud_accessor(Some(writable)).is_valid());

    let acc = elem.get_point_cloud_accessor(None);
    let mut cursor = acc.cursor();
    cursor.to_index(5);
    assert_eq!(cursor.point_id(), 50);
    assert!(cursor.is_point_valid());
}

#[test]
fn counters_survive_moving_the_pager() {
    let (elem, counters) = element_with_mock(descriptor_i32_xyz(2), config());
    drop(elem.get_point_cloud_accessor(None));
    assert_eq!((counters.gets(), counters.releases()), (1, 1));
}
