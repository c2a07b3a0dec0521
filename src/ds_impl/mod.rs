pub mod concurrent_map;
pub mod mutex_map;
pub mod rwlock_map;
pub mod sharded_map;

pub use self::concurrent_map::ConcurrentMap;
pub use self::mutex_map::MutexMap;
pub use self::rwlock_map::RwLockMap;
pub use self::sharded_map::ShardedMap;
