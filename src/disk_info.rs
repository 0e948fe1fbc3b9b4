use std::ffi::CString;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Capacity of the filesystem holding a path.
#[derive(Debug, Clone, Copy)]
pub struct DiskSpace {
    pub total: u64,
    pub free: u64,
}

/// `statvfs` on `path`. `None` if the call fails.
pub fn disk_space(path: &Path) -> Option<DiskSpace> {
    let c_path = CString::new(path.as_os_str().as_bytes()).ok()?;
    let mut stat = MaybeUninit::<libc::statvfs>::uninit();
    // SAFETY: c_path is NUL-terminated and stat points to writable memory.
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if ret != 0 {
        return None;
    }
    // SAFETY: statvfs returned 0, so the struct is initialised.
    let stat = unsafe { stat.assume_init() };
    let block_size = stat.f_frsize as u64;
    Some(DiskSpace {
        total: stat.f_blocks as u64 * block_size,
        free: stat.f_bavail as u64 * block_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_capacity() {
        let space = disk_space(Path::new("/")).unwrap();
        assert!(space.total > 0);
        assert!(space.free <= space.total);
    }

    #[test]
    fn missing_path_is_none() {
        assert!(disk_space(Path::new("/definitely/not/here")).is_none());
    }
}
