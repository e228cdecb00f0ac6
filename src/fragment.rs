//! Typed compiler and linker flags.
//!
//! Tokens from `Cflags` and `Libs` fields are classified into a small set
//! of semantic classes so the merger can select, sort, and deduplicate
//! them per query. A [`Flag`] preserves the original token text — one
//! token for most flags, two for the option-taking forms (`-isystem`,
//! `-idirafter`, `-framework`).

use std::fmt;

/// Semantic class of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagClass {
    /// Include search path flags: `-I...`, `-isystem X`, `-idirafter X`.
    CflagsI,
    /// Every other compiler flag.
    CflagsOther,
    /// Library search path flags: `-L...`.
    LibsL,
    /// Library name flags: `-l...`.
    LibsSmallL,
    /// Every other linker flag, `-framework X` included.
    LibsOther,
}

/// A set of [`FlagClass`] values, used as a per-pass selection mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagMask(u8);

impl FlagMask {
    pub const NONE: Self = Self(0);
    pub const CFLAGS_I: Self = Self(1 << 0);
    pub const CFLAGS_OTHER: Self = Self(1 << 1);
    pub const LIBS_L: Self = Self(1 << 2);
    pub const LIBS_SMALL_L: Self = Self(1 << 3);
    pub const LIBS_OTHER: Self = Self(1 << 4);

    /// Union of two masks.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether this mask selects the given class.
    pub fn contains(self, class: FlagClass) -> bool {
        (self.0 & Self::from(class).0) != 0
    }
}

impl From<FlagClass> for FlagMask {
    fn from(class: FlagClass) -> Self {
        match class {
            FlagClass::CflagsI => Self::CFLAGS_I,
            FlagClass::CflagsOther => Self::CFLAGS_OTHER,
            FlagClass::LibsL => Self::LIBS_L,
            FlagClass::LibsSmallL => Self::LIBS_SMALL_L,
            FlagClass::LibsOther => Self::LIBS_OTHER,
        }
    }
}

/// A classified flag holding one or two original tokens.
///
/// Two flags are equal when both class and token text match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    class: FlagClass,
    args: Vec<String>,
}

impl Flag {
    /// A single-token flag.
    pub fn new(class: FlagClass, arg: impl Into<String>) -> Self {
        Self {
            class,
            args: vec![arg.into()],
        }
    }

    /// A two-token flag (an option-taking form and its argument).
    pub fn with_option(class: FlagClass, arg: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            class,
            args: vec![arg.into(), option.into()],
        }
    }

    pub fn class(&self) -> FlagClass {
        self.class
    }

    /// The original tokens, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args.join(" "))
    }
}

/// Classify shell-split `Cflags` tokens.
///
/// `-I`-prefixed tokens become [`FlagClass::CflagsI`] as-is; `-isystem`
/// and `-idirafter` absorb their following token into a two-token
/// [`FlagClass::CflagsI`] (or degrade to [`FlagClass::CflagsOther`] when
/// nothing follows); everything else is [`FlagClass::CflagsOther`].
pub fn classify_cflags(tokens: &[String]) -> Vec<Flag> {
    let mut flags = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let arg = &tokens[i];
        if arg.starts_with("-I") {
            flags.push(Flag::new(FlagClass::CflagsI, arg));
        } else if (arg == "-idirafter" || arg == "-isystem") && i + 1 < tokens.len() {
            flags.push(Flag::with_option(FlagClass::CflagsI, arg, &tokens[i + 1]));
            i += 1;
        } else {
            flags.push(Flag::new(FlagClass::CflagsOther, arg));
        }
        i += 1;
    }
    flags
}

/// Classify shell-split `Libs` tokens.
///
/// `-l...` (but not `-lib:...`) becomes [`FlagClass::LibsSmallL`],
/// `-L...` becomes [`FlagClass::LibsL`], `-framework` and
/// `-Wl,-framework` absorb their following token into a two-token
/// [`FlagClass::LibsOther`]; everything else is [`FlagClass::LibsOther`].
pub fn classify_libs(tokens: &[String]) -> Vec<Flag> {
    let mut flags = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let arg = &tokens[i];
        if arg.starts_with("-l") && !arg.starts_with("-lib:") {
            flags.push(Flag::new(FlagClass::LibsSmallL, arg));
        } else if arg.starts_with("-L") {
            flags.push(Flag::new(FlagClass::LibsL, arg));
        } else if (arg == "-framework" || arg == "-Wl,-framework") && i + 1 < tokens.len() {
            flags.push(Flag::with_option(FlagClass::LibsOther, arg, &tokens[i + 1]));
            i += 1;
        } else {
            flags.push(Flag::new(FlagClass::LibsOther, arg));
        }
        i += 1;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    // ── Flag basics ─────────────────────────────────────────────────

    #[test]
    fn flag_equality_is_class_and_args() {
        let a = Flag::new(FlagClass::LibsSmallL, "-lfoo");
        let b = Flag::new(FlagClass::LibsSmallL, "-lfoo");
        let c = Flag::new(FlagClass::LibsOther, "-lfoo");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn flag_display_joins_args() {
        let f = Flag::with_option(FlagClass::CflagsI, "-isystem", "/opt/include");
        assert_eq!(f.to_string(), "-isystem /opt/include");
    }

    // ── FlagMask ────────────────────────────────────────────────────

    #[test]
    fn mask_union_and_contains() {
        let mask = FlagMask::LIBS_OTHER.union(FlagMask::LIBS_SMALL_L);
        assert!(mask.contains(FlagClass::LibsOther));
        assert!(mask.contains(FlagClass::LibsSmallL));
        assert!(!mask.contains(FlagClass::LibsL));
        assert!(!FlagMask::NONE.contains(FlagClass::CflagsI));
    }

    // ── Cflags classification ───────────────────────────────────────

    #[test]
    fn cflags_include_is_single_token() {
        let flags = classify_cflags(&tokens(&["-I/usr/include", "-O2"]));
        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0].class(), FlagClass::CflagsI);
        assert_eq!(flags[0].args(), ["-I/usr/include"]);
        assert_eq!(flags[1].class(), FlagClass::CflagsOther);
    }

    #[test]
    fn cflags_isystem_takes_option() {
        let flags = classify_cflags(&tokens(&["-isystem", "/opt/inc", "-DX"]));
        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0].class(), FlagClass::CflagsI);
        assert_eq!(flags[0].args(), ["-isystem", "/opt/inc"]);
        assert_eq!(flags[1].args(), ["-DX"]);
    }

    #[test]
    fn cflags_idirafter_takes_option() {
        let flags = classify_cflags(&tokens(&["-idirafter", "dir"]));
        assert_eq!(flags[0].class(), FlagClass::CflagsI);
        assert_eq!(flags[0].args(), ["-idirafter", "dir"]);
    }

    #[test]
    fn cflags_trailing_isystem_degrades_to_other() {
        let flags = classify_cflags(&tokens(&["-isystem"]));
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].class(), FlagClass::CflagsOther);
        assert_eq!(flags[0].args(), ["-isystem"]);
    }

    #[test]
    fn cflags_bare_dash_i_keeps_whole_token() {
        let flags = classify_cflags(&tokens(&["-I", "dir"]));
        assert_eq!(flags[0].class(), FlagClass::CflagsI);
        assert_eq!(flags[0].args(), ["-I"]);
        assert_eq!(flags[1].class(), FlagClass::CflagsOther);
    }

    // ── Libs classification ─────────────────────────────────────────

    #[test]
    fn libs_classes() {
        let flags = classify_libs(&tokens(&["-L/usr/lib", "-lfoo", "-pthread"]));
        assert_eq!(flags[0].class(), FlagClass::LibsL);
        assert_eq!(flags[1].class(), FlagClass::LibsSmallL);
        assert_eq!(flags[2].class(), FlagClass::LibsOther);
    }

    #[test]
    fn libs_lib_colon_is_not_small_l() {
        let flags = classify_libs(&tokens(&["-lib:static"]));
        assert_eq!(flags[0].class(), FlagClass::LibsOther);
    }

    #[test]
    fn libs_framework_takes_option() {
        let flags = classify_libs(&tokens(&["-framework", "CoreFoundation", "-lz"]));
        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0].class(), FlagClass::LibsOther);
        assert_eq!(flags[0].args(), ["-framework", "CoreFoundation"]);
        assert_eq!(flags[1].class(), FlagClass::LibsSmallL);
    }

    #[test]
    fn libs_wl_framework_takes_option() {
        let flags = classify_libs(&tokens(&["-Wl,-framework", "Cocoa"]));
        assert_eq!(flags[0].args(), ["-Wl,-framework", "Cocoa"]);
    }

    #[test]
    fn libs_trailing_framework_is_plain_other() {
        let flags = classify_libs(&tokens(&["-framework"]));
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].args(), ["-framework"]);
        assert_eq!(flags[0].class(), FlagClass::LibsOther);
    }
}
