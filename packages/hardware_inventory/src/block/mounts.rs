use foldhash::{HashMap, HashMapExt};

/// Where a block device is mounted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Mount {
    pub(crate) point: String,
    pub(crate) filesystem: String,
}

/// Parses `/proc/mounts`, keyed by the device name relative to `/dev/` (e.g. `sda1`).
///
/// Mounts of anything that is not a device node (`proc`, `tmpfs`, ...) are skipped. A device
/// mounted more than once is reported at its first mount point.
pub(crate) fn parse_mounts(contents: &str) -> HashMap<String, Mount> {
    let mut mounts = HashMap::new();

    for line in contents.lines() {
        let mut fields = line.split_whitespace();

        let (Some(source), Some(point), Some(filesystem)) =
            (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };

        let Some(device) = source.strip_prefix("/dev/") else {
            continue;
        };

        mounts.entry(unescape(device)).or_insert_with(|| Mount {
            point: unescape(point),
            filesystem: filesystem.to_string(),
        });
    }

    mounts
}

/// Undoes the octal escaping the kernel applies to whitespace and backslashes, e.g. `\040`.
fn unescape(field: &str) -> String {
    let mut result = String::with_capacity(field.len());
    let mut chars = field.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        let code: String = chars.clone().take(3).collect();

        let decoded = (code.len() == 3 && code.chars().all(|digit| ('0'..='7').contains(&digit)))
            .then(|| u8::from_str_radix(&code, 8).ok())
            .flatten();

        match decoded {
            Some(byte) => {
                result.push(char::from(byte));
                chars.nth(2);
            }
            None => result.push(c),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_mounts_only() {
        let mounts = parse_mounts(
            "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
/dev/nvme0n1p2 / ext4 rw,relatime 0 0
/dev/nvme0n1p1 /boot/efi vfat rw,relatime,fmask=0077 0 0
tmpfs /run tmpfs rw,nosuid,nodev,size=3263200k,mode=755 0 0
",
        );

        assert_eq!(mounts.len(), 2);
        assert_eq!(
            mounts.get("nvme0n1p2"),
            Some(&Mount {
                point: "/".to_string(),
                filesystem: "ext4".to_string(),
            })
        );
        assert_eq!(mounts["nvme0n1p1"].point, "/boot/efi");
        assert_eq!(mounts["nvme0n1p1"].filesystem, "vfat");
    }

    #[test]
    fn first_mount_wins() {
        let mounts = parse_mounts(
            "/dev/sda1 /mnt/data xfs rw 0 0\n/dev/sda1 /srv/data xfs rw 0 0\n",
        );

        assert_eq!(mounts["sda1"].point, "/mnt/data");
    }

    #[test]
    fn escaped_mount_point() {
        let mounts = parse_mounts("/dev/sdb1 /media/usb\\040stick vfat rw 0 0\n");

        assert_eq!(mounts["sdb1"].point, "/media/usb stick");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let mounts = parse_mounts("/dev/sda1\n\n/dev/sda2 /home\n/dev/sda3 /var ext4 rw 0 0\n");

        assert_eq!(mounts.len(), 1);
        assert!(mounts.contains_key("sda3"));
    }

    #[test]
    fn unescape_leaves_invalid_sequences() {
        assert_eq!(unescape("a\\134b"), "a\\b");
        assert_eq!(unescape("a\\9b"), "a\\9b");
        assert_eq!(unescape("trailing\\04"), "trailing\\04");
    }
}
