//! Process liveness probing.

/// Reports whether `pid` refers to a running process.
///
/// Pid 0 is the store's "unknown" sentinel and always reports dead here;
/// callers that garbage-collect must already have excluded it, since absence
/// of information is not evidence of death.
pub fn is_alive(pid: u32) -> bool {
    if pid == 0 {
        return false;
    }

    #[cfg(unix)]
    {
        // SAFETY: kill with signal 0 delivers nothing; it only performs the
        // existence and permission checks. The pid comes from a session
        // record, and a stale value simply yields ESRCH.
        #[allow(unsafe_code)]
        let rc = unsafe { libc::kill(pid as i32, 0) };
        if rc == 0 {
            return true;
        }
        // EPERM means the process exists but belongs to someone else.
        std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
    }

    #[cfg(not(unix))]
    {
        false
    }
}
