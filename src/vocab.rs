//! RDF Vocabulary Constants
//!
//! Centralized IRIs for the vocabularies the store reads and writes:
//! - `rdf` - RDF syntax vocabulary
//! - `ldp` - Linked Data Platform
//! - `acl` - Web Access Control
//! - `prov` - PROV-O, used for audit triples
//! - `activity_streams` - ActivityStreams 2.0 activity types
//! - `trellis` - server vocabulary: named graphs, constraint IRIs, agents

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:langString IRI
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

/// XSD vocabulary constants
pub mod xsd {
    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

/// Linked Data Platform vocabulary constants
pub mod ldp {
    pub const NAMESPACE: &str = "http://www.w3.org/ns/ldp#";

    pub const RESOURCE: &str = "http://www.w3.org/ns/ldp#Resource";
    pub const RDF_SOURCE: &str = "http://www.w3.org/ns/ldp#RDFSource";
    pub const NON_RDF_SOURCE: &str = "http://www.w3.org/ns/ldp#NonRDFSource";
    pub const CONTAINER: &str = "http://www.w3.org/ns/ldp#Container";
    pub const BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";
    pub const DIRECT_CONTAINER: &str = "http://www.w3.org/ns/ldp#DirectContainer";
    pub const INDIRECT_CONTAINER: &str = "http://www.w3.org/ns/ldp#IndirectContainer";

    /// ldp:contains (containment triple predicate)
    pub const CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
    /// ldp:member (default membership relation)
    pub const MEMBER: &str = "http://www.w3.org/ns/ldp#member";
    pub const MEMBERSHIP_RESOURCE: &str = "http://www.w3.org/ns/ldp#membershipResource";
    pub const HAS_MEMBER_RELATION: &str = "http://www.w3.org/ns/ldp#hasMemberRelation";
    pub const IS_MEMBER_OF_RELATION: &str = "http://www.w3.org/ns/ldp#isMemberOfRelation";
    pub const INSERTED_CONTENT_RELATION: &str = "http://www.w3.org/ns/ldp#insertedContentRelation";
    /// ldp:MemberSubject (default inserted content relation)
    pub const MEMBER_SUBJECT: &str = "http://www.w3.org/ns/ldp#MemberSubject";
    pub const INBOX: &str = "http://www.w3.org/ns/ldp#inbox";
}

/// Web Access Control vocabulary constants
pub mod acl {
    pub const ACCESS_CONTROL: &str = "http://www.w3.org/ns/auth/acl#accessControl";
}

/// Web Annotation vocabulary constants
pub mod oa {
    pub const ANNOTATION_SERVICE: &str = "http://www.w3.org/ns/oa#annotationService";
}

/// PROV-O vocabulary constants
pub mod prov {
    pub const ACTIVITY: &str = "http://www.w3.org/ns/prov#Activity";
    pub const WAS_ASSOCIATED_WITH: &str = "http://www.w3.org/ns/prov#wasAssociatedWith";
    pub const WAS_GENERATED_BY: &str = "http://www.w3.org/ns/prov#wasGeneratedBy";
    pub const AT_TIME: &str = "http://www.w3.org/ns/prov#atTime";
}

/// ActivityStreams 2.0 vocabulary constants
pub mod activity_streams {
    pub const CONTEXT: &str = "https://www.w3.org/ns/activitystreams";
    pub const NAMESPACE: &str = "https://www.w3.org/ns/activitystreams#";

    pub const CREATE: &str = "https://www.w3.org/ns/activitystreams#Create";
    pub const UPDATE: &str = "https://www.w3.org/ns/activitystreams#Update";
    pub const DELETE: &str = "https://www.w3.org/ns/activitystreams#Delete";
}

/// Server vocabulary: named graphs, constraint IRIs and well-known agents
pub mod trellis {
    pub const NAMESPACE: &str = "http://www.trellisldp.org/ns/trellis#";

    /// Graph holding client-supplied triples
    pub const PREFER_USER_MANAGED: &str = "http://www.trellisldp.org/ns/trellis#PreferUserManaged";
    /// Graph holding type, containment and membership triples
    pub const PREFER_SERVER_MANAGED: &str =
        "http://www.trellisldp.org/ns/trellis#PreferServerManaged";
    /// Graph holding provenance activities
    pub const PREFER_AUDIT: &str = "http://www.trellisldp.org/ns/trellis#PreferAudit";

    pub const INVALID_TYPE: &str = "http://www.trellisldp.org/ns/trellis#InvalidType";
    pub const INVALID_PROPERTY: &str = "http://www.trellisldp.org/ns/trellis#InvalidProperty";
    pub const INVALID_RANGE: &str = "http://www.trellisldp.org/ns/trellis#InvalidRange";
    pub const INVALID_CARDINALITY: &str =
        "http://www.trellisldp.org/ns/trellis#InvalidCardinality";

    pub const ANONYMOUS_AGENT: &str = "http://www.trellisldp.org/ns/trellis#AnonymousAgent";
    pub const ADMINISTRATOR_AGENT: &str =
        "http://www.trellisldp.org/ns/trellis#AdministratorAgent";
}
