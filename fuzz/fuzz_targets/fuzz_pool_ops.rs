#![no_main]

use libfuzzer_sys::fuzz_target;

use blockpool::BlockPool;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    // First two bytes pick the pool shape, the rest drive acquire/release
    let count = usize::from(data[0] % 64) + 1;
    let size = usize::from(data[1]) + 1;
    let mut pool = BlockPool::create(count, size).unwrap();
    let mut held = Vec::new();

    for &byte in &data[2..] {
        if byte & 1 == 0 {
            match pool.acquire() {
                Some(block) => {
                    pool.write(&block, &block.index()).unwrap();
                    held.push(block);
                }
                None => assert_eq!(held.len(), count),
            }
        } else if !held.is_empty() {
            let block = held.swap_remove(usize::from(byte >> 1) % held.len());
            assert_eq!(pool.read::<usize>(&block).unwrap(), block.index());
            pool.release(block);
        }
        assert_eq!(pool.free_count() + held.len(), count);
    }
});
