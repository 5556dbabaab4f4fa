//! Browser support data for the prefixes this crate knows about.
//!
//! Versions are encoded the way lightningcss encodes them:
//! `major << 16 | minor << 8`.

use lightningcss::targets::Browsers;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Engine {
  Android,
  Chrome,
  Edge,
  Firefox,
  Ie,
  IosSaf,
  Opera,
  Safari,
  Samsung,
}

impl Engine {
  fn version(self, browsers: &Browsers) -> Option<u32> {
    match self {
      Engine::Android => browsers.android,
      Engine::Chrome => browsers.chrome,
      Engine::Edge => browsers.edge,
      Engine::Firefox => browsers.firefox,
      Engine::Ie => browsers.ie,
      Engine::IosSaf => browsers.ios_saf,
      Engine::Opera => browsers.opera,
      Engine::Safari => browsers.safari,
      Engine::Samsung => browsers.samsung,
    }
  }
}

/// A browser that needs `prefix` below `unprefixed_since`.
///
/// For value features `prefix` is the whole prefixed value, for selector
/// features the prefixed pseudo-element.
#[derive(Debug)]
pub(crate) struct Support {
  pub engine: Engine,
  pub prefix: &'static str,
  pub unprefixed_since: u32,
}

#[derive(Debug)]
pub(crate) enum FeatureKind {
  Property(&'static [&'static str]),
  Value {
    props: &'static [&'static str],
    value: &'static str,
  },
  AtRule(&'static str),
  Selector(&'static str),
}

#[derive(Debug)]
pub(crate) struct Feature {
  pub kind: FeatureKind,
  pub support: &'static [Support],
}

impl Feature {
  /// Prefixes needed by at least one target, in table order, deduplicated.
  pub fn prefixes(&self, browsers: &Browsers) -> Vec<&'static str> {
    let mut prefixes = Vec::new();
    for support in self.support {
      let needed = support
        .engine
        .version(browsers)
        .is_some_and(|version| version < support.unprefixed_since);
      if needed && !prefixes.contains(&support.prefix) {
        prefixes.push(support.prefix);
      }
    }
    prefixes
  }
}

const fn v(major: u32, minor: u32) -> u32 {
  (major << 16) | (minor << 8)
}

/// Still prefixed in the latest release.
const NEVER: u32 = u32::MAX;

const fn support(engine: Engine, prefix: &'static str, unprefixed_since: u32) -> Support {
  Support {
    engine,
    prefix,
    unprefixed_since,
  }
}

use Engine::*;

const MASK_SUPPORT: &[Support] = &[
  support(Chrome, "-webkit-", v(120, 0)),
  support(Edge, "-webkit-", v(120, 0)),
  support(Opera, "-webkit-", v(106, 0)),
  support(Safari, "-webkit-", v(15, 4)),
  support(IosSaf, "-webkit-", v(15, 4)),
  support(Samsung, "-webkit-", v(25, 0)),
  support(Android, "-webkit-", v(120, 0)),
];

const SIZING_PROPS: &[&str] = &[
  "width",
  "min-width",
  "max-width",
  "height",
  "min-height",
  "max-height",
];

pub(crate) const FEATURES: &[Feature] = &[
  Feature {
    kind: FeatureKind::Property(&["user-select"]),
    support: &[
      support(Chrome, "-webkit-", v(54, 0)),
      support(Android, "-webkit-", v(54, 0)),
      support(Opera, "-webkit-", v(41, 0)),
      support(Samsung, "-webkit-", v(6, 2)),
      support(Safari, "-webkit-", NEVER),
      support(IosSaf, "-webkit-", NEVER),
      support(Firefox, "-moz-", v(69, 0)),
      support(Ie, "-ms-", NEVER),
      support(Edge, "-ms-", v(79, 0)),
    ],
  },
  Feature {
    kind: FeatureKind::Property(&["appearance"]),
    support: &[
      support(Chrome, "-webkit-", v(84, 0)),
      support(Android, "-webkit-", v(84, 0)),
      support(Opera, "-webkit-", v(70, 0)),
      support(Samsung, "-webkit-", v(14, 0)),
      support(Safari, "-webkit-", v(15, 4)),
      support(IosSaf, "-webkit-", v(15, 4)),
      support(Edge, "-webkit-", v(84, 0)),
      support(Firefox, "-moz-", v(80, 0)),
    ],
  },
  Feature {
    kind: FeatureKind::Property(&["backdrop-filter"]),
    support: &[
      support(Safari, "-webkit-", v(18, 0)),
      support(IosSaf, "-webkit-", v(18, 0)),
    ],
  },
  Feature {
    kind: FeatureKind::Property(&["text-size-adjust"]),
    support: &[
      support(IosSaf, "-webkit-", NEVER),
      support(Firefox, "-moz-", NEVER),
      support(Edge, "-ms-", v(79, 0)),
    ],
  },
  Feature {
    kind: FeatureKind::Property(&[
      "mask",
      "mask-image",
      "mask-size",
      "mask-position",
      "mask-repeat",
      "mask-origin",
      "mask-clip",
      "mask-composite",
    ]),
    support: MASK_SUPPORT,
  },
  Feature {
    kind: FeatureKind::Property(&["clip-path"]),
    support: &[
      support(Chrome, "-webkit-", v(55, 0)),
      support(Android, "-webkit-", v(55, 0)),
      support(Opera, "-webkit-", v(42, 0)),
      support(Samsung, "-webkit-", v(6, 0)),
      support(Safari, "-webkit-", v(13, 1)),
      support(IosSaf, "-webkit-", v(13, 0)),
    ],
  },
  Feature {
    kind: FeatureKind::Property(&["hyphens"]),
    support: &[
      support(Safari, "-webkit-", v(17, 0)),
      support(IosSaf, "-webkit-", v(17, 0)),
      support(Firefox, "-moz-", v(43, 0)),
      support(Ie, "-ms-", NEVER),
      support(Edge, "-ms-", v(79, 0)),
    ],
  },
  Feature {
    kind: FeatureKind::Property(&["tab-size"]),
    support: &[support(Firefox, "-moz-", v(91, 0))],
  },
  Feature {
    kind: FeatureKind::Property(&["box-decoration-break"]),
    support: &[
      support(Chrome, "-webkit-", v(130, 0)),
      support(Edge, "-webkit-", v(130, 0)),
      support(Opera, "-webkit-", v(115, 0)),
      support(Android, "-webkit-", v(130, 0)),
      support(Samsung, "-webkit-", NEVER),
      support(Safari, "-webkit-", NEVER),
      support(IosSaf, "-webkit-", NEVER),
    ],
  },
  Feature {
    kind: FeatureKind::Value {
      props: &["position"],
      value: "sticky",
    },
    support: &[
      support(Safari, "-webkit-sticky", v(13, 0)),
      support(IosSaf, "-webkit-sticky", v(13, 0)),
    ],
  },
  Feature {
    kind: FeatureKind::Value {
      props: SIZING_PROPS,
      value: "fit-content",
    },
    support: &[support(Firefox, "-moz-fit-content", v(94, 0))],
  },
  Feature {
    kind: FeatureKind::AtRule("keyframes"),
    support: &[
      support(Chrome, "-webkit-", v(43, 0)),
      support(Android, "-webkit-", v(4, 4)),
      support(Opera, "-webkit-", v(30, 0)),
      support(Safari, "-webkit-", v(9, 0)),
      support(IosSaf, "-webkit-", v(9, 0)),
    ],
  },
  Feature {
    kind: FeatureKind::Selector("::placeholder"),
    support: &[
      support(Chrome, "::-webkit-input-placeholder", v(57, 0)),
      support(Android, "::-webkit-input-placeholder", v(57, 0)),
      support(Opera, "::-webkit-input-placeholder", v(44, 0)),
      support(Samsung, "::-webkit-input-placeholder", v(7, 0)),
      support(Safari, "::-webkit-input-placeholder", v(10, 1)),
      support(IosSaf, "::-webkit-input-placeholder", v(10, 3)),
      support(Firefox, "::-moz-placeholder", v(51, 0)),
      support(Ie, ":-ms-input-placeholder", NEVER),
      support(Edge, "::-ms-input-placeholder", v(79, 0)),
    ],
  },
];
