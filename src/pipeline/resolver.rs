//! Company name cleanup and website resolution.

use crate::core::config::Config;
use crate::core::models::{DomainNote, ExecutiveRecord, ResolutionConfidence};
use crate::utils::domain::company_slug;
use crate::utils::http::PageFetcher;
use std::collections::{BTreeMap, HashMap};

pub const SOURCE_NO_COMPANY: &str = "No company information available";
pub const SOURCE_NOT_FOUND: &str = "Company website not found - manual research required";

/// Known company keys and their canonical domains. Keys are lowercase and
/// matched as whole words against the cleaned company name.
pub const COMPANY_DOMAIN_MAP: &[(&str, &str)] = &[
    ("inseego", "inseego.com"),
    ("infineon", "infineon.com"),
    ("aws", "aws.amazon.com"),
    ("world surf league", "worldsurfleague.com"),
    ("allcloud", "allcloud.io"),
    ("honeycomb.io", "honeycomb.io"),
    ("spacelift", "spacelift.io"),
    ("fabrix.ai", "fabrix.ai"),
    ("vultr", "vultr.com"),
    ("ge aerospace", "geaerospace.com"),
    ("auditboard", "auditboard.com"),
    ("uipath", "uipath.com"),
    ("salt security", "salt.security"),
    ("ebay", "ebay.com"),
    ("crowdstrike", "crowdstrike.com"),
    ("tensor", "tensorsecurity.com"),
    ("ddn", "ddn.com"),
    ("redline advisors", "redlineadvisors.com"),
    ("dynatrace", "dynatrace.com"),
    ("ledger", "ledger.com"),
    ("google cloud", "cloud.google.com"),
    ("heroku", "heroku.com"),
    ("triptych info", "triptychinfo.com"),
    ("spectra logic", "spectralogic.com"),
    ("infinidat", "infinidat.com"),
    ("index engines", "indexengines.com"),
    ("thecube research", "thecuberesearch.com"),
    ("kiteworks", "kiteworks.com"),
    ("equinix", "equinix.com"),
    ("couchbase", "couchbase.com"),
    ("broadforward", "broadforward.com"),
    ("cato networks", "catonetworks.com"),
    ("stackpane", "stackpane.com"),
    ("neo4j", "neo4j.com"),
    ("arrcus", "arrcus.com"),
    ("adobe enterprise", "adobe.com"),
    ("amd", "amd.com"),
    ("denexus", "denexus.io"),
    ("applied intuition", "appliedintuition.com"),
    ("scaleflux", "scaleflux.com"),
    ("nutanix", "nutanix.com"),
    ("cerebras", "cerebras.net"),
    ("transcarent", "transcarent.com"),
    ("airmdr", "airmdr.com"),
    ("typeface", "typeface.ai"),
    ("arm", "arm.com"),
    ("early growth advisory", "earlygrowthadvisory.com"),
    ("together ai", "together.ai"),
    ("groq", "groq.com"),
    ("ingram micro cloud", "ingrammicrocloud.com"),
    ("deloitte", "deloitte.com"),
    ("logicmonitor", "logicmonitor.com"),
    ("escala 24x7", "escala24x7.com"),
    ("commercetools", "commercetools.com"),
    ("prophix", "prophix.com"),
    ("netapp", "netapp.com"),
    ("san francisco 49ers", "49ers.com"),
    ("boomi", "boomi.com"),
    ("sas institute", "sas.com"),
    ("ericsson", "ericsson.com"),
    ("teradata", "teradata.com"),
    ("newtonx", "newtonx.com"),
    ("aruba", "arubanetworks.com"),
    ("cobalt iron", "cobaltiron.com"),
    ("ibm", "ibm.com"),
    ("cloudian", "cloudian.com"),
    ("forrester research", "forrester.com"),
    ("nvidia", "nvidia.com"),
    ("idc", "idc.com"),
    ("snowflake", "snowflake.com"),
    ("qlik", "qlik.com"),
    ("chronosphere", "chronosphere.io"),
    ("juniper networks", "juniper.net"),
    ("dartmouth college", "dartmouth.edu"),
    ("intel", "intel.com"),
    ("hpe", "hpe.com"),
    ("impetus technologies", "impetus.com"),
    ("zillow", "zillow.com"),
    ("informatica", "informatica.com"),
    ("cribl", "cribl.io"),
    ("mongodb", "mongodb.com"),
    ("mitel", "mitel.com"),
    ("sdvi corporation", "sdvi.com"),
    ("lacework", "lacework.com"),
    ("messagebird", "messagebird.com"),
    ("datastax", "datastax.com"),
    ("releasehub", "releasehub.com"),
    ("sisense", "sisense.com"),
    ("influxdata", "influxdata.com"),
    ("commvault", "commvault.com"),
    ("syncreon", "syncreon.com"),
    ("veeam", "veeam.com"),
    ("explorium", "explorium.ai"),
    ("mitchell international", "mitchell.com"),
    ("kyndryl", "kyndryl.com"),
    ("fortinet", "fortinet.com"),
    ("agero", "agero.com"),
    ("acoustic", "acoustic.com"),
    ("citrix", "citrix.com"),
    ("actifio", "actifio.com"),
    ("cockroach labs", "cockroachlabs.com"),
    ("automation anywhere", "automationanywhere.com"),
    ("kenna security", "kennasecurity.com"),
    ("cohesity", "cohesity.com"),
    ("coupa", "coupa.com"),
    ("uniphore", "uniphore.com"),
    ("vlocity", "vlocity.com"),
    ("splunk", "splunk.com"),
    ("acronis", "acronis.com"),
    ("smartsheet", "smartsheet.com"),
    ("tintri by ddn", "tintri.com"),
    ("veritas", "veritas.com"),
    ("us signal", "ussignal.com"),
    ("sequoia capital", "sequoiacap.com"),
    ("tempered networks", "temperednetworks.com"),
    ("five9", "five9.com"),
    ("keysight", "keysight.com"),
    ("tripactions", "tripactions.com"),
    ("sciencelogic", "sciencelogic.com"),
    ("sap", "sap.com"),
    ("alteryx", "alteryx.com"),
    ("zerto", "zerto.com"),
    ("mirantis", "mirantis.com"),
    ("wandisco", "wandisco.com"),
    ("tableau", "tableau.com"),
    ("rackspace", "rackspace.com"),
    ("ge", "ge.com"),
    ("servicenow", "servicenow.com"),
    ("service now", "servicenow.com"),
    ("emc", "delltechnologies.com"),
    ("csc", "dxctechnology.com"),
    ("hcl", "hcltech.com"),
    ("ifs", "ifs.com"),
    ("techdivision", "techdivision.com"),
    ("gabor shoes", "gabor.com"),
    ("new relic", "newrelic.com"),
    ("openlink", "openlinksw.com"),
    ("softwareone", "softwareone.com"),
    ("cyxtera", "cyxtera.com"),
    ("druva", "druva.com"),
    ("robin.io", "robin.io"),
    ("panviva", "panviva.com"),
    ("mesosphere", "d2iq.com"),
    ("qad", "qad.com"),
    ("turbonomic", "turbonomic.com"),
    ("igel", "igel.com"),
    ("locus robotics", "locusrobotics.com"),
    ("marketo", "marketo.com"),
    ("zuora", "zuora.com"),
    ("attunity", "attunity.com"),
    ("verizon", "verizon.com"),
    ("qubole", "qubole.com"),
    ("sonatype", "sonatype.com"),
    ("oracle", "oracle.com"),
    ("time warner", "warnermedia.com"),
    ("octane ai", "octaneai.com"),
    ("redis labs", "redis.com"),
    ("avanade", "avanade.com"),
    ("ixia", "ixiacom.com"),
    ("continuum analytics", "continuum.io"),
    ("igneous systems", "igneous.io"),
    ("riverbed", "riverbed.com"),
    ("noobaa", "noobaa.io"),
    ("predix", "predix.io"),
    ("talend", "talend.com"),
    ("basho", "basho.com"),
    ("the clorox company", "thecloroxcompany.com"),
    ("cafex", "cafex.com"),
    ("local motors", "localmotors.com"),
    ("pentaho", "pentaho.com"),
    ("atscale", "atscale.com"),
    ("tegile", "tegile.com"),
    ("vmware", "vmware.com"),
    ("salesforce", "salesforce.com"),
    ("microsoft", "microsoft.com"),
    ("adobe", "adobe.com"),
    ("palo alto networks", "paloaltonetworks.com"),
    ("dell technologies", "dell.com"),
    ("dell", "dell.com"),
    ("twilio", "twilio.com"),
    ("zscaler", "zscaler.com"),
    ("mcafee", "mcafee.com"),
];

/// The lowercase company names that mean "no company given".
const NO_COMPANY_MARKERS: &[&str] = &["", "(company not stated)", "–"];

/// Splits on dash-like separators and keeps the last segment, drops
/// parenthesized notes and collapses whitespace:
/// `"Keynote — Acme Corp (USA)"` becomes `"Acme Corp"`.
pub fn clean_company_name(company: &str) -> String {
    let trimmed = company.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let last_part = trimmed
        .split(['—', '-', '–'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .last()
        .unwrap_or(trimmed);

    let mut without_parens = String::with_capacity(last_part.len());
    let mut depth = 0usize;
    for c in last_part.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => without_parens.push(c),
            _ => {}
        }
    }
    without_parens.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn contains_whole_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let begin = start + pos;
        let end = begin + needle.len();
        let before_ok = haystack[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = begin + needle.chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// Company-to-domain lookup: the built-in table plus configured entries.
#[derive(Debug, Clone)]
pub struct DomainTable {
    entries: Vec<(String, String)>,
}

impl Default for DomainTable {
    fn default() -> Self {
        Self {
            entries: COMPANY_DOMAIN_MAP
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl DomainTable {
    /// Built-in table with `extra` applied on top. An existing key takes the
    /// configured domain; new keys are appended.
    pub fn with_overrides(extra: &BTreeMap<String, String>) -> Self {
        let mut table = Self::default();
        for (key, domain) in extra {
            let key = key.trim().to_lowercase();
            let domain = domain.trim().to_lowercase();
            if key.is_empty() || domain.is_empty() {
                continue;
            }
            match table.entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = domain,
                None => table.entries.push((key, domain)),
            }
        }
        table
    }

    /// Longest whole-word key found in the company name; equal lengths keep
    /// table order.
    pub fn lookup(&self, company: &str) -> Option<&str> {
        let lowered = company.to_lowercase();
        let mut best: Option<&(String, String)> = None;
        for entry in &self.entries {
            if contains_whole_words(&lowered, &entry.0)
                && best.map_or(true, |b| entry.0.len() > b.0.len())
            {
                best = Some(entry);
            }
        }
        best.map(|(_, domain)| domain.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lookup against the built-in table only.
pub fn lookup_known_domain(company: &str) -> Option<String> {
    DomainTable::default().lookup(company).map(str::to_string)
}

/// Outcome of resolving one company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub website: String,
    pub source: String,
    pub notes: DomainNote,
    pub confidence: ResolutionConfidence,
}

impl Resolution {
    fn verified(final_url: String, notes: DomainNote, confidence: ResolutionConfidence) -> Self {
        Self {
            source: final_url.clone(),
            website: final_url,
            notes,
            confidence,
        }
    }

    fn unresolved(source: &str, notes: DomainNote) -> Self {
        Self {
            website: String::new(),
            source: source.to_string(),
            notes,
            confidence: ResolutionConfidence::Low,
        }
    }
}

/// Resolves companies to live websites, remembering each outcome for the
/// rest of the run.
pub struct CompanyResolver {
    table: DomainTable,
    timeout: std::time::Duration,
    cache: HashMap<String, Resolution>,
}

impl CompanyResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            table: DomainTable::with_overrides(&config.extra_company_domains),
            timeout: config.request_timeout,
            cache: HashMap::new(),
        }
    }

    async fn probe(&self, fetcher: &dyn PageFetcher, url: &str) -> Option<String> {
        tracing::debug!(target: "resolver_task", "Probing {}", url);
        fetcher.get(url, self.timeout).await.map(|page| page.final_url)
    }

    /// Resolves a raw company value. The flag is true when HTTP requests were
    /// made for this call.
    pub async fn resolve(&mut self, fetcher: &dyn PageFetcher, company: &str) -> (Resolution, bool) {
        let cleaned = clean_company_name(company);
        if NO_COMPANY_MARKERS.contains(&cleaned.to_lowercase().as_str()) {
            return (
                Resolution::unresolved(SOURCE_NO_COMPANY, DomainNote::NoCompanyInfo),
                false,
            );
        }

        let cache_key = cleaned.to_lowercase();
        if let Some(hit) = self.cache.get(&cache_key) {
            tracing::debug!(target: "resolver_task", "Cache hit for '{}'", cleaned);
            return (hit.clone(), false);
        }

        let resolution = self.resolve_uncached(fetcher, &cleaned).await;
        self.cache.insert(cache_key, resolution.clone());
        (resolution, true)
    }

    async fn resolve_uncached(&self, fetcher: &dyn PageFetcher, company: &str) -> Resolution {
        if let Some(domain) = self.table.lookup(company).map(str::to_string) {
            if let Some(final_url) = self.probe(fetcher, &format!("https://{}", domain)).await {
                return Resolution::verified(
                    final_url,
                    DomainNote::MappedKnownDomain,
                    ResolutionConfidence::High,
                );
            }
            if !domain.starts_with("www.") {
                let www = format!("https://www.{}", domain);
                if let Some(final_url) = self.probe(fetcher, &www).await {
                    return Resolution::verified(
                        final_url,
                        DomainNote::VerifiedFromMapping,
                        ResolutionConfidence::High,
                    );
                }
            }
        }

        let slug = company_slug(company);
        if !slug.is_empty() {
            let guess = format!("https://www.{}.com", slug);
            if let Some(final_url) = self.probe(fetcher, &guess).await {
                return Resolution::verified(
                    final_url,
                    DomainNote::VerifiedFromSlug,
                    ResolutionConfidence::Medium,
                );
            }
        }

        tracing::debug!(target: "resolver_task", "No website found for '{}'", company);
        Resolution::unresolved(SOURCE_NOT_FOUND, DomainNote::NotFound)
    }

    /// Resolves and writes the outcome into the record, replacing `Company`
    /// with the cleaned name. Returns whether HTTP requests were made.
    pub async fn resolve_record(&mut self, fetcher: &dyn PageFetcher, record: &mut ExecutiveRecord) -> bool {
        let (resolution, fetched) = self.resolve(fetcher, &record.company).await;
        record.company = clean_company_name(&record.company);
        record.company_website = resolution.website;
        record.source = resolution.source;
        record.domain_notes = Some(resolution.notes);
        record.confidence = Some(resolution.confidence);
        fetched
    }
}
