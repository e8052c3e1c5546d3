//! Built-in head rules for English Penn Treebank trees.
//!
//! Collins-style priority lists: for each category the clauses are tried in
//! order, each scanning the children in its direction. Clauses without a
//! direction keep the direction of the previous clause.

/// Head rules for English, in the head-rule text format.
pub const ENGLISH_HEAD_RULES: &str = r"# Collins (1999) head rules, adapted
ADJP   l NNS; QP; NN; \$; ADVP; JJ; VBN; VBG; ADJP; JJR; NP; JJS; DT; FW; RBR; RBS; SBAR; RB
ADVP   r RB; RBR; RBS; FW; ADVP; TO; CD; JJR; JJ; IN; NP; JJS; NN
CONJP  r CC; RB; IN
FRAG   r .*
INTJ   l .*
LST    r LS; :
NAC    l NN; NNS; NNP; NNPS; NP; NAC; EX; \$; CD; QP; PRP; VBG; JJ; JJS; JJR; ADJP; FW
NP     r NN|NNP|NNPS|NNS|NX|POS|JJR; l NP; r \$|ADJP|PRN; r CD; r JJ|JJS|RB|QP; r .*
NX     r NN|NNP|NNPS|NNS|NX|POS|JJR; l NP; r \$|ADJP|PRN; r CD; r JJ|JJS|RB|QP; r .*
PP     r IN; TO; VBG; VBN; RP; FW
PRN    l .*
PRT    r RP
QP     l \$; IN; NNS; NN; JJ; RB; DT; CD; NCD; QP; JJR; JJS
RRC    r VP; NP; ADVP; ADJP; PP
S      l TO; IN; VP; S; SBAR; ADJP; UCP; NP
SBAR   l WHNP; WHPP; WHADVP; WHADJP; IN; DT; S; SQ; SINV; SBAR; FRAG
SBARQ  l SQ; S; SINV; SBARQ; FRAG
SINV   l VBZ; VBD; VBP; VB; MD; VP; S; SINV; ADJP; NP
SQ     l VBZ; VBD; VBP; VB; MD; VP; SQ
UCP    r .*
VP     l TO; VBD; VBN; MD; VBZ; VB; VBG; VBP; VP; ADJP; NN; NNS; NP
WHADJP l CC; WRB; JJ; ADJP
WHADVP r CC; WRB
WHNP   l WDT; WP; WP\$; WHADJP; WHPP; WHNP
WHPP   r IN; TO; FW
X      r .*
*      l .*
";
